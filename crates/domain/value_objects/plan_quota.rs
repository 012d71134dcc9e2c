use crate::domain::{
    errors::PublishingError,
    value_objects::enums::{content_types::ContentType, plan_tiers::PlanTier},
};

/// Maximum number of publications of `content_type` a client on `plan` may own,
/// counted regardless of status. Unknown plans get no capacity.
pub fn quota_limit(plan: &str, content_type: ContentType) -> i64 {
    let Some(tier) = PlanTier::parse(plan) else {
        return 0;
    };

    match (tier, content_type) {
        (PlanTier::Basic, ContentType::Reel) => 4,
        (PlanTier::Basic, ContentType::Post) => 8,
        (PlanTier::Standard, ContentType::Reel) => 8,
        (PlanTier::Standard, ContentType::Post) => 10,
        (PlanTier::Full, ContentType::Reel) => 15,
        (PlanTier::Full, ContentType::Post) => 15,
    }
}

pub fn can_create(plan: &str, content_type: ContentType, current_count: i64) -> bool {
    current_count < quota_limit(plan, content_type)
}

pub fn ensure_can_create(
    plan: &str,
    content_type: ContentType,
    current_count: i64,
) -> Result<(), PublishingError> {
    if can_create(plan, content_type, current_count) {
        return Ok(());
    }

    Err(PublishingError::QuotaExceeded {
        plan: plan.to_string(),
        content_type,
        limit: quota_limit(plan, content_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_match_plan_table() {
        let table = [
            ("BASIC", ContentType::Reel, 4),
            ("BASIC", ContentType::Post, 8),
            ("STANDARD", ContentType::Reel, 8),
            ("STANDARD", ContentType::Post, 10),
            ("FULL", ContentType::Reel, 15),
            ("FULL", ContentType::Post, 15),
        ];

        for (plan, content_type, limit) in table {
            assert_eq!(quota_limit(plan, content_type), limit, "{plan} {content_type}");
            assert!(can_create(plan, content_type, limit - 1));
            assert!(!can_create(plan, content_type, limit));
        }
    }

    #[test]
    fn unknown_plan_fails_closed() {
        assert_eq!(quota_limit("ENTERPRISE", ContentType::Post), 0);
        assert!(!can_create("ENTERPRISE", ContentType::Post, 0));
        assert!(!can_create("basic", ContentType::Reel, 0));
    }

    #[test]
    fn fifth_reel_on_basic_is_rejected_with_context() {
        let err = ensure_can_create("BASIC", ContentType::Reel, 4).unwrap_err();
        match err {
            PublishingError::QuotaExceeded {
                plan,
                content_type,
                limit,
            } => {
                assert_eq!(plan, "BASIC");
                assert_eq!(content_type, ContentType::Reel);
                assert_eq!(limit, 4);
            }
            other => panic!("expected quota error, got: {other}"),
        }
    }

    #[test]
    fn one_below_limit_is_allowed() {
        assert!(ensure_can_create("STANDARD", ContentType::Post, 9).is_ok());
    }
}
