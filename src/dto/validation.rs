//! Validation helpers for DTOs.

use validator::ValidationError;

/// Rejects empty or whitespace-only strings.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("Rivers") // Ok
/// validate_not_blank("   ")    // Err
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Rejects a fixture where a club would play itself.
pub fn validate_distinct_teams(team_a: &str, team_b: &str) -> Result<(), ValidationError> {
    if team_a.trim() == team_b.trim() {
        let mut err = ValidationError::new("same_teams");
        err.message = Some("a match needs two different teams".into());
        return Err(err);
    }
    Ok(())
}

/// Goals listed for a completed match must add up to its final score.
pub fn validate_goal_count(
    goals: usize,
    score_a: u32,
    score_b: u32,
) -> Result<(), ValidationError> {
    let expected = u64::from(score_a) + u64::from(score_b);
    if goals as u64 != expected {
        let mut err = ValidationError::new("goal_count");
        err.message = Some(
            format!("expected {expected} goals for a {score_a}-{score_b} score (got {goals})")
                .into(),
        );
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(validate_not_blank("Rivers").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t").is_err());
    }

    #[test]
    fn same_team_twice_is_rejected() {
        assert!(validate_distinct_teams("t1", "t2").is_ok());
        assert!(validate_distinct_teams("t1", " t1").is_err());
    }

    #[test]
    fn goal_count_must_match_score() {
        assert!(validate_goal_count(3, 2, 1).is_ok());
        assert!(validate_goal_count(0, 0, 0).is_ok());
        assert!(validate_goal_count(2, 2, 1).is_err());
    }
}
