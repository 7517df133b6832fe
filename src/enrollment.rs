use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{CheckoutRequest, EnrollmentOutcome},
    repository::RepositoryState,
};

/// EnrollmentError
///
/// Failure taxonomy of the Enrollment Transaction. `PaymentNotRecorded` means
/// step 1 failed and nothing was changed; `PartialApply` means the payment is
/// durably recorded but the cleanup steps fell short, and carries the counts
/// a client needs to retry the remainder. Partial failure is never masked as
/// success.
#[derive(Debug, Error, PartialEq)]
pub enum EnrollmentError {
    #[error("checkout must reference at least one cart item and one class")]
    EmptyReferences,
    #[error("checkout references a class that does not exist")]
    UnknownClassReference,
    #[error("payment was not recorded; no enrollment state was changed")]
    PaymentNotRecorded,
    #[error(
        "enrollment partially applied for payment {payment_id}: \
         removed {carts_removed}/{carts_expected} cart items, \
         adjusted {classes_updated}/{classes_expected} classes"
    )]
    PartialApply {
        payment_id: Uuid,
        carts_expected: u64,
        carts_removed: u64,
        classes_expected: u64,
        classes_updated: u64,
    },
}

/// finalize
///
/// Realizes the effects of a completed payment against the store:
///
/// 1. Append the payment record. On failure, abort before any other write.
/// 2. Delete every cart item referenced by the payment (id match is
///    sufficient scoping; ids are globally unique).
/// 3. For each *distinct* referenced class, apply one conditional seat
///    adjustment (+1 enrolled / -1 available, only while seats remain).
///
/// Class references must resolve to existing classes before anything is
/// written: a payment pointing at a class the store has never held could
/// only ever produce a shortfall that no retry can clear, so it is rejected
/// up front instead.
///
/// The store provides per-document atomicity only, so steps 2 and 3 can fall
/// short after step 1 succeeded; that state is reported as
/// `EnrollmentError::PartialApply` rather than swallowed.
///
/// Class references are deduplicated first: a payment listing class C twice
/// still moves C's counters exactly once. The adjustment is issued per class,
/// never as one batched multi-document update.
pub async fn finalize(
    repo: &RepositoryState,
    request: &CheckoutRequest,
) -> Result<EnrollmentOutcome, EnrollmentError> {
    if request.cart_item_ids.is_empty() || request.class_item_ids.is_empty() {
        return Err(EnrollmentError::EmptyReferences);
    }

    let cart_ids = dedupe(&request.cart_item_ids);
    let class_ids = dedupe(&request.class_item_ids);

    // Every referenced class must exist before the payment is recorded.
    if repo.get_classes_by_ids(&class_ids).await.len() < class_ids.len() {
        return Err(EnrollmentError::UnknownClassReference);
    }

    // Step 1: append-only payment record. A missing record here means the
    // checkout simply did not happen; nothing to clean up.
    let payment = repo
        .insert_payment(request)
        .await
        .ok_or(EnrollmentError::PaymentNotRecorded)?;

    // Step 2: clear the purchased selections from the cart.
    let carts_expected = cart_ids.len() as u64;
    let carts_removed = repo.delete_cart_items(&cart_ids).await;

    // Step 3: one conditional adjustment per distinct class. A class that is
    // already full (or missing) leaves its counter untouched and shows up in
    // the shortfall below.
    let classes_expected = class_ids.len() as u64;
    let mut classes_updated = 0u64;
    for class_id in &class_ids {
        if repo.adjust_class_seats(*class_id).await {
            classes_updated += 1;
        }
    }

    if carts_removed < carts_expected || classes_updated < classes_expected {
        tracing::warn!(
            payment_id = %payment.id,
            carts_removed,
            carts_expected,
            classes_updated,
            classes_expected,
            "enrollment partially applied"
        );
        return Err(EnrollmentError::PartialApply {
            payment_id: payment.id,
            carts_expected,
            carts_removed,
            classes_expected,
            classes_updated,
        });
    }

    Ok(EnrollmentOutcome {
        payment,
        carts_removed,
        classes_updated,
    })
}

/// First-occurrence deduplication. Reference lists are tiny (a cart's worth),
/// so the quadratic scan beats hashing here.
fn dedupe(ids: &[Uuid]) -> Vec<Uuid> {
    let mut distinct: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !distinct.contains(id) {
            distinct.push(*id);
        }
    }
    distinct
}

#[cfg(test)]
mod tests {
    use super::dedupe;
    use uuid::Uuid;

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedupe(&[a, b, a, a, b]), vec![a, b]);
    }

    #[test]
    fn dedupe_of_empty_is_empty() {
        assert!(dedupe(&[]).is_empty());
    }
}
