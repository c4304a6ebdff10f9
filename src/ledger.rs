use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::fmt::balance_label;
use crate::models::{DualLedgerRow, LedgerRow, Transaction};

/// Stable sort by date, then insertion id. Rows without an id keep their
/// relative order among rows of the same date.
pub fn sort_chronologically(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| {
        a.date.cmp(&b.date).then_with(|| match (a.id, b.id) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => std::cmp::Ordering::Equal,
        })
    });
}

/// Fails with `OutOfOrder` at the first row that sorts before its predecessor.
pub fn ensure_chronological(txns: &[Transaction]) -> Result<()> {
    for (index, pair) in txns.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let id_regressed = matches!((prev.id, cur.id), (Some(p), Some(c)) if c < p);
        if cur.date < prev.date || (cur.date == prev.date && id_regressed) {
            return Err(LedgerError::OutOfOrder {
                index: index + 1,
                date: cur.date.to_string(),
                previous: prev.date.to_string(),
            });
        }
    }
    Ok(())
}

fn split(amount: Decimal) -> (Decimal, Decimal) {
    if amount.is_sign_negative() {
        (-amount, Decimal::ZERO)
    } else {
        (Decimal::ZERO, amount)
    }
}

/// Running-balance statement over chronologically ordered transactions.
pub fn accumulate(txns: &[Transaction]) -> Result<Vec<LedgerRow>> {
    ensure_chronological(txns)?;

    let mut running = Decimal::ZERO;
    let rows = txns
        .iter()
        .map(|t| {
            let amount = t.amount_or_zero();
            running += amount;
            let (debit, credit) = split(amount);
            LedgerRow {
                date: t.date,
                voucher_type: t.voucher_type.clone(),
                voucher_no: t.voucher_no.clone(),
                debit,
                credit,
                running_balance: running,
                balance_label: balance_label(running),
            }
        })
        .collect();
    Ok(rows)
}

/// Like [`accumulate`], but tracks two balances in the same pass: one over
/// rows posted to the owner's own ledger and one over every voucher row.
pub fn accumulate_dual(txns: &[Transaction], owner_name: &str) -> Result<Vec<DualLedgerRow>> {
    ensure_chronological(txns)?;

    let mut owner_balance = Decimal::ZERO;
    let mut voucher_balance = Decimal::ZERO;
    let rows = txns
        .iter()
        .map(|t| {
            let amount = t.amount_or_zero();
            let in_owner_ledger = t.ledger_name.as_deref() == Some(owner_name);
            if in_owner_ledger {
                owner_balance += amount;
            }
            voucher_balance += amount;
            let (debit, credit) = split(amount);
            DualLedgerRow {
                date: t.date,
                voucher_type: t.voucher_type.clone(),
                voucher_no: t.voucher_no.clone(),
                ledger_name: t.ledger_name.clone(),
                debit,
                credit,
                in_owner_ledger,
                owner_balance,
                owner_label: balance_label(owner_balance),
                voucher_balance,
                voucher_label: balance_label(voucher_balance),
            }
        })
        .collect();
    Ok(rows)
}
