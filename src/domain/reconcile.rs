use crate::domain::{Ledger, Rejection};

/// Optimistic check: is the stored balance still explained by completed history?
///
/// PENDING records, including the one being decided, never count.
pub fn reconcile(ledger: &Ledger) -> Result<(), Rejection> {
    let expected = ledger.reconciled_sum().ok_or(Rejection::Overflow)?;
    let actual = ledger.balance();

    if expected == actual {
        Ok(())
    } else {
        Err(Rejection::Conflict { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Money, Transaction, TransactionKind, TransactionStatus};

    #[test]
    fn agrees_with_fresh_opening_balance() {
        let mut ledger = Ledger::new(Money::from(1000));
        ledger.ensure_opening_balance();
        ledger.append(Transaction::pending(TransactionKind::Deposit, Money::from(200)));

        assert_eq!(reconcile(&ledger), Ok(()));
    }

    #[test]
    fn history_outside_money_range_is_rejected() {
        let mut ledger = Ledger::new(Money::max_value());
        ledger.ensure_opening_balance();
        ledger.overwrite_balance(Money::zero());
        let index = ledger.append(Transaction::pending(TransactionKind::Deposit, Money::from(1)));
        ledger.finalize(index, TransactionStatus::Complete).unwrap();

        assert_eq!(reconcile(&ledger), Err(Rejection::Overflow));
    }

    #[test]
    fn detects_external_drift() {
        let mut ledger = Ledger::new(Money::from(1000));
        ledger.ensure_opening_balance();
        ledger.overwrite_balance(Money::from(900));

        assert_eq!(
            reconcile(&ledger),
            Err(Rejection::Conflict {
                expected: Money::from(1000),
                actual: Money::from(900),
            })
        );
    }
}
