//! Data snapshots: the denormalized trip fields a page was generated from.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::itinerary::{Activity, FlightLeg, Hotel, Itinerary};
use crate::page::PageTemplate;

/// Cover and trip-level fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverData {
    /// Customer or group name.
    pub client_name: Option<String>,
    /// Destination country.
    pub country: Option<String>,
    /// Destination city.
    pub city: Option<String>,
    /// Printed travel dates.
    pub travel_dates: Option<String>,
    /// Cover image URL.
    pub cover_image: Option<String>,
    /// Overview image URL.
    pub overview_image: Option<String>,
    /// Three-letter airport code.
    pub airport_code: Option<String>,
    /// Emergency phone.
    pub emergency_contact: Option<String>,
    /// Emergency email.
    pub emergency_email: Option<String>,
    /// Trip summary.
    pub summary: Option<String>,
}

impl CoverData {
    /// `"<country> <city>"`, or `None` when both are missing.
    #[must_use]
    pub fn trip_name(&self) -> Option<String> {
        let name = [self.country.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!name.is_empty()).then_some(name)
    }
}

/// Outbound and return flights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightData {
    /// Outbound leg.
    pub outbound: Option<FlightLeg>,
    /// Return leg.
    #[serde(rename = "return")]
    pub return_leg: Option<FlightLeg>,
}

/// Meeting and leader fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingData {
    /// Leader name.
    pub leader_name: Option<String>,
    /// Leader phone.
    pub leader_phone: Option<String>,
    /// Meeting time.
    pub meeting_time: Option<String>,
    /// Meeting location.
    pub meeting_location: Option<String>,
    /// First travel day, `YYYY-MM-DD`.
    pub departure_date: Option<String>,
}

/// One travel day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayData {
    /// Zero-based day index.
    pub day_index: usize,
    /// Day title.
    pub title: Option<String>,
    /// One-line highlight.
    pub highlight: Option<String>,
    /// Notes.
    pub description: Option<String>,
    /// Activities in order.
    pub activities: Vec<Activity>,
    /// Image URLs.
    pub images: Vec<String>,
}

impl DayData {
    /// One-based day number.
    #[must_use]
    pub fn number(&self) -> usize {
        self.day_index + 1
    }
}

/// Condensed day entry for overview pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayOverview {
    /// Zero-based day index.
    pub day_index: usize,
    /// Day title, defaulted when missing.
    pub title: String,
    /// Activity titles.
    pub activities: Vec<String>,
}

/// Trip data captured when a page was generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSnapshot {
    /// Cover fields.
    pub cover: Option<CoverData>,
    /// Flight fields.
    pub flight: Option<FlightData>,
    /// Meeting fields.
    pub meeting: Option<MeetingData>,
    /// The page's day, for daily templates.
    pub day: Option<DayData>,
    /// All days, for overview templates.
    pub daily_overview: Vec<DayOverview>,
    /// Hotels.
    pub accommodations: Vec<Hotel>,
}

impl DataSnapshot {
    /// Capture the fields of `itinerary` that `template` needs.
    ///
    /// `day_index` selects the day for daily templates; an out-of-range index
    /// leaves `day` empty and the generator falls back to a placeholder.
    #[must_use]
    pub fn from_itinerary(
        itinerary: &Itinerary,
        template: PageTemplate,
        day_index: Option<usize>,
    ) -> Self {
        let cover = CoverData {
            client_name: itinerary.client_name.clone(),
            country: itinerary.country.clone(),
            city: itinerary.city.clone(),
            travel_dates: itinerary.departure_date.clone(),
            cover_image: itinerary.cover_image.clone(),
            overview_image: itinerary.overview_image.clone(),
            airport_code: itinerary
                .tour_code
                .as_deref()
                .map(|code| code.chars().take(3).collect()),
            emergency_contact: itinerary.emergency_contact.clone(),
            emergency_email: itinerary.emergency_email.clone(),
            summary: itinerary.description.clone(),
        };

        let flight = (itinerary.outbound_flight.is_some() || itinerary.return_flight.is_some())
            .then(|| FlightData {
                outbound: itinerary.outbound_flight.clone(),
                return_leg: itinerary.return_flight.clone(),
            });

        let meeting = MeetingData {
            leader_name: itinerary.leader.as_ref().and_then(|l| l.name.clone()),
            leader_phone: itinerary.leader.as_ref().and_then(|l| l.phone.clone()),
            meeting_time: itinerary.meeting_info.as_ref().and_then(|m| m.time.clone()),
            meeting_location: itinerary
                .meeting_info
                .as_ref()
                .and_then(|m| m.location.clone()),
            departure_date: itinerary.departure_date.clone(),
        };

        let day = day_index.and_then(|index| {
            itinerary.daily_itinerary.get(index).map(|d| DayData {
                day_index: index,
                title: d.title.clone(),
                highlight: d.highlight.clone(),
                description: d.description.clone(),
                activities: d.activities.clone(),
                images: d.images.iter().map(|i| i.url().to_string()).collect(),
            })
        });

        let daily_overview = if template == PageTemplate::OverviewRight {
            itinerary
                .daily_itinerary
                .iter()
                .enumerate()
                .map(|(index, d)| DayOverview {
                    day_index: index,
                    title: d
                        .title
                        .clone()
                        .unwrap_or_else(|| format!("Day {}", index + 1)),
                    activities: d.activities.iter().map(|a| a.title.clone()).collect(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            cover: Some(cover),
            flight,
            meeting: Some(meeting),
            day,
            daily_overview,
            accommodations: itinerary.hotels.clone(),
        }
    }
}

/// Pointer from a page back to the trip data it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    /// Itinerary identifier.
    pub itinerary_id: String,
    /// Day index for daily pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_index: Option<usize>,
    /// When the snapshot was last taken, in Unix milliseconds.
    pub synced_at_ms: u64,
}

impl SourceReference {
    /// Reference stamped with the current time.
    #[must_use]
    pub fn new(itinerary_id: impl Into<String>, day_index: Option<usize>) -> Self {
        Self {
            itinerary_id: itinerary_id.into(),
            day_index,
            synced_at_ms: current_timestamp_ms(),
        }
    }
}

/// Get the current Unix timestamp in milliseconds.
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::{ItineraryDay, Leader};

    fn sample() -> Itinerary {
        Itinerary {
            id: "trip-9".into(),
            country: Some("Japan".into()),
            city: Some("Osaka".into()),
            tour_code: Some("KIX240501".into()),
            departure_date: Some("2024-05-01".into()),
            leader: Some(Leader {
                name: Some("Lin".into()),
                phone: Some("0912".into()),
            }),
            daily_itinerary: vec![
                ItineraryDay {
                    title: Some("Arrival".into()),
                    ..ItineraryDay::default()
                },
                ItineraryDay::default(),
            ],
            ..Itinerary::default()
        }
    }

    #[test]
    fn test_snapshot_cover_and_meeting() {
        let snapshot = DataSnapshot::from_itinerary(&sample(), PageTemplate::Cover, None);
        let cover = snapshot.cover.expect("cover");
        assert_eq!(cover.airport_code.as_deref(), Some("KIX"));
        assert_eq!(cover.trip_name().as_deref(), Some("Japan Osaka"));
        let meeting = snapshot.meeting.expect("meeting");
        assert_eq!(meeting.leader_name.as_deref(), Some("Lin"));
        assert!(snapshot.flight.is_none());
        assert!(snapshot.day.is_none());
        assert!(snapshot.daily_overview.is_empty());
    }

    #[test]
    fn test_snapshot_day_selection() {
        let snapshot = DataSnapshot::from_itinerary(&sample(), PageTemplate::DailyLeft, Some(0));
        let day = snapshot.day.expect("day");
        assert_eq!(day.number(), 1);
        assert_eq!(day.title.as_deref(), Some("Arrival"));

        let missing = DataSnapshot::from_itinerary(&sample(), PageTemplate::DailyLeft, Some(5));
        assert!(missing.day.is_none());
    }

    #[test]
    fn test_snapshot_overview_defaults_titles() {
        let snapshot = DataSnapshot::from_itinerary(&sample(), PageTemplate::OverviewRight, None);
        assert_eq!(snapshot.daily_overview.len(), 2);
        assert_eq!(snapshot.daily_overview[1].title, "Day 2");
    }
}
