use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_window", skip_on_field_errors = false))]
pub struct ScheduleJobCommand {
    #[serde(default)]
    pub job_id: Uuid,
    pub planned_start: DateTime<Utc>,
    pub planned_end: DateTime<Utc>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
}

fn validate_window(command: &ScheduleJobCommand) -> Result<(), ValidationError> {
    if command.planned_start >= command.planned_end {
        return Err(ValidationError::new("planned_start_after_end"));
    }
    if let Some(due) = command.due_at {
        if due < command.planned_start {
            return Err(ValidationError::new("due_before_planned_start"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn inverted_window_fails_validation() {
        let now = Utc::now();
        let command = ScheduleJobCommand {
            job_id: Uuid::new_v4(),
            planned_start: now + Duration::hours(2),
            planned_end: now,
            due_at: None,
        };
        assert!(command.validate().is_err());
    }

    #[test]
    fn due_date_may_not_precede_start() {
        let now = Utc::now();
        let command = ScheduleJobCommand {
            job_id: Uuid::new_v4(),
            planned_start: now,
            planned_end: now + Duration::hours(2),
            due_at: Some(now - Duration::hours(1)),
        };
        assert!(command.validate().is_err());

        let command = ScheduleJobCommand {
            due_at: Some(now + Duration::hours(4)),
            ..command
        };
        assert!(command.validate().is_ok());
    }
}
