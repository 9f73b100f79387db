use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Weekday codes as stored and served ("Mon".."Sun").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Mon,
            Weekday::Tue => DayOfWeek::Tue,
            Weekday::Wed => DayOfWeek::Wed,
            Weekday::Thu => DayOfWeek::Thu,
            Weekday::Fri => DayOfWeek::Fri,
            Weekday::Sat => DayOfWeek::Sat,
            Weekday::Sun => DayOfWeek::Sun,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Mon => "Mon",
            DayOfWeek::Tue => "Tue",
            DayOfWeek::Wed => "Wed",
            DayOfWeek::Thu => "Thu",
            DayOfWeek::Fri => "Fri",
            DayOfWeek::Sat => "Sat",
            DayOfWeek::Sun => "Sun",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Mon" => Some(DayOfWeek::Mon),
            "Tue" => Some(DayOfWeek::Tue),
            "Wed" => Some(DayOfWeek::Wed),
            "Thu" => Some(DayOfWeek::Thu),
            "Fri" => Some(DayOfWeek::Fri),
            "Sat" => Some(DayOfWeek::Sat),
            "Sun" => Some(DayOfWeek::Sun),
            _ => None,
        }
    }
}

/// A weekly schedule template for one bus. At most one exists per bus;
/// concrete dated trips are materialized elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringTrip {
    pub id: Uuid,
    pub bus_id: Uuid,
    pub operator_id: Uuid,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub days_of_week: Vec<DayOfWeek>,
    pub created_at: DateTime<Utc>,
}

impl RecurringTrip {
    /// Whether the bus runs on the given calendar day.
    pub fn operates_on(&self, date: NaiveDate) -> bool {
        self.days_of_week
            .contains(&DayOfWeek::from_weekday(date.weekday()))
    }
}

#[derive(Debug, Clone)]
pub struct NewRecurringTrip {
    pub bus_id: Uuid,
    pub operator_id: Uuid,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub days_of_week: Vec<DayOfWeek>,
}

#[derive(Debug, Clone)]
pub struct TripUpdate {
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub days_of_week: Vec<DayOfWeek>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(days: Vec<DayOfWeek>) -> RecurringTrip {
        RecurringTrip {
            id: Uuid::new_v4(),
            bus_id: Uuid::new_v4(),
            operator_id: Uuid::new_v4(),
            departure_time: NaiveTime::from_hms_opt(21, 30, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            days_of_week: days,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_operates_on_matches_weekday() {
        let trip = trip(vec![DayOfWeek::Mon, DayOfWeek::Fri]);

        // 2025-04-21 is a Monday, 2025-04-22 a Tuesday.
        let monday = NaiveDate::from_ymd_opt(2025, 4, 21).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 4, 22).unwrap();

        assert!(trip.operates_on(monday));
        assert!(!trip.operates_on(tuesday));
    }

    #[test]
    fn test_day_codes_round_trip() {
        for day in [
            DayOfWeek::Mon,
            DayOfWeek::Tue,
            DayOfWeek::Wed,
            DayOfWeek::Thu,
            DayOfWeek::Fri,
            DayOfWeek::Sat,
            DayOfWeek::Sun,
        ] {
            assert_eq!(DayOfWeek::parse(day.as_str()), Some(day));
        }
        assert_eq!(DayOfWeek::parse("Monday"), None);
    }
}
