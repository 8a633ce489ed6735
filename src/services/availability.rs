use serde::Serialize;

use crate::models::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub remaining: i64,
    pub status: Status,
}

/// Derives remaining seats and the status label from capacity and the
/// booked total.
///
/// `remaining` is clamped at zero so an overbooked ledger still reads as
/// sold out rather than going negative.
pub fn compute_status(total_capacity: i32, booked_count: i64) -> Availability {
    let remaining = (i64::from(total_capacity) - booked_count).max(0);
    let status = if remaining <= 0 {
        Status::SoldOut
    } else {
        Status::BookAsap
    };
    Availability { remaining, status }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fresh_inventory_is_bookable() {
        assert_eq!(
            compute_status(10, 0),
            Availability { remaining: 10, status: Status::BookAsap }
        );
    }

    #[test]
    fn partially_booked() {
        assert_eq!(
            compute_status(10, 4),
            Availability { remaining: 6, status: Status::BookAsap }
        );
    }

    #[test]
    fn exactly_full_is_sold_out() {
        assert_eq!(
            compute_status(10, 10),
            Availability { remaining: 0, status: Status::SoldOut }
        );
    }

    #[test]
    fn zero_capacity_is_sold_out() {
        assert_eq!(compute_status(0, 0).status, Status::SoldOut);
    }

    #[test]
    fn overbooked_clamps_to_zero() {
        assert_eq!(
            compute_status(10, 13),
            Availability { remaining: 0, status: Status::SoldOut }
        );
    }

    proptest! {
        #[test]
        fn remaining_never_negative(capacity in 0i32..100_000, booked in 0i64..200_000) {
            let availability = compute_status(capacity, booked);
            prop_assert!(availability.remaining >= 0);
            prop_assert!(availability.remaining <= i64::from(capacity));
            prop_assert_eq!(
                availability.status == Status::SoldOut,
                availability.remaining == 0
            );
        }

        #[test]
        fn same_inputs_same_output(capacity in 0i32..1_000, booked in 0i64..2_000) {
            prop_assert_eq!(compute_status(capacity, booked), compute_status(capacity, booked));
        }

        #[test]
        fn remaining_is_capacity_minus_booked_when_it_fits(capacity in 1i32..1_000, booked in 0i64..1_000) {
            prop_assume!(booked <= i64::from(capacity));
            let availability = compute_status(capacity, booked);
            prop_assert_eq!(availability.remaining, i64::from(capacity) - booked);
        }
    }
}
