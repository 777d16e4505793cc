//! Payment schedule generation.
//!
//! Every plan yields rows whose amounts sum exactly to the order total.

use chrono::{Months, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::PaymentPlan;
use crate::errors::WizardError;

/// A payment row before it is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScheduledPayment {
    pub label: String,
    pub amount: u64,
    pub due_date: NaiveDate,
}

/// Build the payment rows for `plan`.
///
/// - `full`: one row due at `start`.
/// - `split`: a deposit of `total / 2` due at `start`, the balance due at `deadline`.
/// - `installments`: `months` rows one month apart starting at `start`; the
///   division remainder goes on the first row.
///
/// # Errors
///
/// Returns [`WizardError::InvalidInstallments`] when the month count is outside
/// `2..=12`.
pub fn payment_schedule(
    plan: PaymentPlan,
    total: u64,
    start: NaiveDate,
    deadline: NaiveDate,
) -> Result<Vec<ScheduledPayment>, WizardError> {
    match plan {
        PaymentPlan::Full => Ok(vec![ScheduledPayment {
            label: "Full payment".into(),
            amount: total,
            due_date: start,
        }]),
        PaymentPlan::Split => {
            let deposit = total / 2;
            Ok(vec![
                ScheduledPayment {
                    label: "Deposit".into(),
                    amount: deposit,
                    due_date: start,
                },
                ScheduledPayment {
                    label: "Balance".into(),
                    amount: total - deposit,
                    due_date: deadline,
                },
            ])
        }
        PaymentPlan::Installments { months } => {
            if !(PaymentPlan::MIN_INSTALLMENTS..=PaymentPlan::MAX_INSTALLMENTS).contains(&months) {
                return Err(WizardError::InvalidInstallments(months));
            }
            let count = u64::from(months);
            let each = total / count;
            let remainder = total % count;
            Ok((0..months)
                .map(|i| ScheduledPayment {
                    label: format!("Installment {} of {months}", i + 1),
                    amount: if i == 0 { each + remainder } else { each },
                    due_date: start
                        .checked_add_months(Months::new(u32::from(i)))
                        .unwrap_or(NaiveDate::MAX),
                })
                .collect())
        }
    }
}
