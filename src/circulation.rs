//! Library circulation model
//!
//! Pure transition rules for the Book / Loan / Fine state machines. The
//! functions here only inspect entity snapshots and decide whether a
//! requested transition is legal; persistence is the repository layer's
//! job, which re-checks every guard with an atomic conditional UPDATE so
//! two racing writers cannot both win.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookStatus},
        fine::{Fine, FineStatus},
        loan::Loan,
    },
};

/// Reason recorded on fines emitted for late returns
pub const OVERDUE_REASON: &str = "overdue";

/// Length of the generated membership number
pub const MEMBERSHIP_NUMBER_LEN: usize = 8;

/// Loan to be inserted when a check-out is accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanDraft {
    pub member_id: i32,
    pub book_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Fine to be inserted when a check-in closes a loan late
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FineDraft {
    pub member_id: i32,
    pub reason: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Outcome of an accepted check-in
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub returned_at: DateTime<Utc>,
    /// Present when the loan closed after its due date
    pub fine: Option<FineDraft>,
}

/// Policy computing the amount of an overdue fine
///
/// The amount formula is a configuration point, not part of the model;
/// callers inject whichever policy the deployment wants.
pub trait FeePolicy: Send + Sync {
    fn overdue_amount(&self, due_date: DateTime<Utc>, returned_at: DateTime<Utc>) -> Decimal;
}

/// Default policy: a fixed rate per started day of lateness
#[derive(Debug, Clone)]
pub struct DailyRatePolicy {
    pub daily_rate: Decimal,
}

impl FeePolicy for DailyRatePolicy {
    fn overdue_amount(&self, due_date: DateTime<Utc>, returned_at: DateTime<Utc>) -> Decimal {
        let late_seconds = (returned_at - due_date).num_seconds().max(0);
        // A started day counts as a full day, never less than one
        let late_days = ((late_seconds + 86_399) / 86_400).max(1);
        self.daily_rate * Decimal::from(late_days)
    }
}

/// Validate a check-out request against the book's state
///
/// The book must be `Available` and the due date strictly in the future.
pub fn check_out(
    book: &Book,
    member_id: i32,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppResult<LoanDraft> {
    if due_date <= now {
        return Err(AppError::Validation(
            "Due date must be after the loan date".to_string(),
        ));
    }
    if book.status != BookStatus::Available {
        return Err(AppError::InvalidState(format!(
            "Book {} is not available",
            book.id
        )));
    }

    Ok(LoanDraft {
        member_id,
        book_id: book.id,
        loan_date: now,
        due_date,
    })
}

/// Validate a check-in request against the loan's state
///
/// The loan must still be open. When it closes past its due date, the
/// outcome carries an overdue fine draft for the loan's member, priced by
/// the injected fee policy.
pub fn check_in(loan: &Loan, now: DateTime<Utc>, fee_policy: &dyn FeePolicy) -> AppResult<CheckIn> {
    if loan.returned_date.is_some() {
        return Err(AppError::InvalidState(format!(
            "Loan {} is already closed",
            loan.id
        )));
    }

    let fine = if now > loan.due_date {
        Some(FineDraft {
            member_id: loan.member_id,
            reason: OVERDUE_REASON.to_string(),
            amount: fee_policy.overdue_amount(loan.due_date, now),
            created_at: now,
        })
    } else {
        None
    };

    Ok(CheckIn {
        returned_at: now,
        fine,
    })
}

/// True iff the loan is still open and its due date has passed
pub fn is_overdue(loan: &Loan, as_of: DateTime<Utc>) -> bool {
    loan.returned_date.is_none() && as_of > loan.due_date
}

/// Validate a fine payment against the fine's state
pub fn pay_fine(fine: &Fine) -> AppResult<FineStatus> {
    if fine.status == FineStatus::Paid {
        return Err(AppError::InvalidState(format!(
            "Fine {} is already paid",
            fine.id
        )));
    }
    Ok(FineStatus::Paid)
}

/// Generate a membership number: the first 8 hex characters of a v4 UUID,
/// uppercased
///
/// The generator has no visibility into already-issued numbers; uniqueness
/// is enforced by the unique index on `"Socios"."NumeroSocio"`, and the
/// insert is retried on collision.
pub fn generate_membership_number() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..MEMBERSHIP_NUMBER_LEN].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn book(status: BookStatus) -> Book {
        Book {
            id: 1,
            title: "El Aleph".to_string(),
            author: "Jorge Luis Borges".to_string(),
            isbn: "9788499089515".to_string(),
            status,
        }
    }

    fn open_loan(due_date: DateTime<Utc>) -> Loan {
        Loan {
            id: 7,
            member_id: 42,
            book_id: 1,
            loan_date: due_date - Duration::days(7),
            due_date,
            returned_date: None,
        }
    }

    fn policy() -> DailyRatePolicy {
        DailyRatePolicy {
            daily_rate: dec!(0.50),
        }
    }

    #[test]
    fn check_out_then_check_in_leaves_no_open_loan() {
        let now = Utc::now();
        let draft = check_out(&book(BookStatus::Available), 42, now + Duration::days(7), now)
            .expect("check-out of an available book must succeed");
        assert_eq!(draft.loan_date, now);
        assert_eq!(draft.book_id, 1);

        let loan = Loan {
            id: 7,
            member_id: draft.member_id,
            book_id: draft.book_id,
            loan_date: draft.loan_date,
            due_date: draft.due_date,
            returned_date: None,
        };
        let outcome = check_in(&loan, now, &policy()).expect("first check-in must succeed");
        assert_eq!(outcome.returned_at, now);
        assert!(outcome.fine.is_none(), "on-time return must not emit a fine");
    }

    #[test]
    fn check_out_of_loaned_book_is_rejected() {
        let now = Utc::now();
        let err = check_out(&book(BookStatus::Loaned), 42, now + Duration::days(7), now)
            .expect_err("loaned book must not be checked out again");
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn check_out_with_past_due_date_is_rejected() {
        let now = Utc::now();
        for due in [now, now - Duration::days(1)] {
            let err = check_out(&book(BookStatus::Available), 42, due, now)
                .expect_err("due date must be strictly after now");
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn check_in_of_closed_loan_is_rejected() {
        let now = Utc::now();
        let mut loan = open_loan(now + Duration::days(7));
        loan.returned_date = Some(now);

        let err = check_in(&loan, now, &policy()).expect_err("closed loan must stay closed");
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn late_check_in_emits_exactly_one_overdue_fine() {
        // Book checked out with due date D+7, returned at D+10
        let loan_date = Utc::now() - Duration::days(10);
        let due_date = loan_date + Duration::days(7);
        let returned_at = loan_date + Duration::days(10);
        let loan = open_loan(due_date);

        assert!(is_overdue(&loan, returned_at));

        let outcome = check_in(&loan, returned_at, &policy()).unwrap();
        let fine = outcome.fine.expect("late return must emit a fine");
        assert_eq!(fine.member_id, 42);
        assert_eq!(fine.reason, OVERDUE_REASON);
        assert_eq!(fine.amount, dec!(1.50)); // 3 late days at 0.50
    }

    #[test]
    fn is_overdue_is_false_for_any_closed_loan() {
        let now = Utc::now();
        let mut loan = open_loan(now - Duration::days(30));
        loan.returned_date = Some(now - Duration::days(29));

        for as_of in [now - Duration::days(60), now, now + Duration::days(365)] {
            assert!(!is_overdue(&loan, as_of));
        }
    }

    #[test]
    fn is_overdue_only_after_due_date() {
        let due = Utc::now();
        let loan = open_loan(due);
        assert!(!is_overdue(&loan, due));
        assert!(is_overdue(&loan, due + Duration::seconds(1)));
    }

    #[test]
    fn pay_fine_rejects_second_payment() {
        let mut fine = Fine {
            id: 3,
            member_id: 42,
            reason: OVERDUE_REASON.to_string(),
            amount: dec!(1.50),
            created_at: Utc::now(),
            status: FineStatus::Unpaid,
        };

        assert_eq!(pay_fine(&fine).unwrap(), FineStatus::Paid);

        fine.status = FineStatus::Paid;
        let err = pay_fine(&fine).expect_err("paid fine must stay paid");
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn daily_rate_charges_every_started_day() {
        let due = Utc::now();
        let policy = policy();
        // One second late still counts as one day
        assert_eq!(policy.overdue_amount(due, due + Duration::seconds(1)), dec!(0.50));
        assert_eq!(policy.overdue_amount(due, due + Duration::days(1)), dec!(0.50));
        assert_eq!(
            policy.overdue_amount(due, due + Duration::days(1) + Duration::seconds(1)),
            dec!(1.00)
        );
    }

    #[test]
    fn membership_numbers_are_short_uppercase_tokens() {
        let number = generate_membership_number();
        assert_eq!(number.len(), MEMBERSHIP_NUMBER_LEN);
        assert!(number
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn membership_numbers_are_distinct_across_many_draws() {
        // 10,000 draws out of a 16^8 space; a collision here is possible
        // but far below the random source's expected rate
        let numbers: HashSet<String> =
            (0..10_000).map(|_| generate_membership_number()).collect();
        assert!(numbers.len() > 9_980);
    }
}
