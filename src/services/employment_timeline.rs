use chrono::NaiveDate;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::person::PersonRecord;
use crate::utils::date_range::{parse_month, year_month, YearMonth};

/// A person's employment percentage over time: the baseline plus dated
/// overrides, validated once and sorted by effective month.
#[derive(Debug, Clone, PartialEq)]
pub struct EmploymentTimeline {
    baseline: f64,
    changes: Vec<(YearMonth, f64)>,
}

impl EmploymentTimeline {
    pub fn from_person(person: &PersonRecord) -> AppResult<Self> {
        ensure_percentage(person.employment_percentage, &person.id, None)?;

        let mut changes: Vec<(YearMonth, f64)> = Vec::with_capacity(person.employment_changes.len());
        for change in &person.employment_changes {
            let month = parse_month(&change.effective_month)?;
            ensure_percentage(
                change.employment_percentage,
                &person.id,
                Some(&change.effective_month),
            )?;
            if changes.iter().any(|(existing, _)| *existing == month) {
                return Err(AppError::validation_with_details(
                    "duplicate employment change month",
                    json!({"personId": person.id, "effectiveMonth": change.effective_month}),
                ));
            }
            changes.push((month, change.employment_percentage));
        }
        changes.sort_by_key(|(month, _)| *month);

        Ok(Self {
            baseline: person.employment_percentage,
            changes,
        })
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Percentage in force on `date`: the latest change whose effective month
    /// is not after the date's month, otherwise the baseline.
    pub fn percent_on(&self, date: NaiveDate) -> f64 {
        let month = year_month(date);
        let position = self
            .changes
            .partition_point(|(effective, _)| *effective <= month);
        if position == 0 {
            self.baseline
        } else {
            self.changes[position - 1].1
        }
    }
}

/// One-shot lookup for callers that do not hold a prepared timeline.
pub fn employment_percent_on_date(person: &PersonRecord, date: NaiveDate) -> AppResult<f64> {
    Ok(EmploymentTimeline::from_person(person)?.percent_on(date))
}

fn ensure_percentage(value: f64, person_id: &str, month: Option<&str>) -> AppResult<()> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::validation_with_details(
            "employment percentage must be between 0 and 100",
            json!({"personId": person_id, "effectiveMonth": month, "value": value.to_string()}),
        ))
    }
}
