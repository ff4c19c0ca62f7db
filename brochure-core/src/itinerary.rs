//! Trip records supplied by the itinerary data provider.
//!
//! These mirror the provider's JSON shape. Every field is optional on the
//! wire; missing collections deserialize as empty.

use serde::{Deserialize, Serialize};

/// A complete trip itinerary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Itinerary {
    /// Provider identifier.
    pub id: String,
    /// Trip title.
    pub title: Option<String>,
    /// Free-text summary.
    pub description: Option<String>,
    /// Destination country.
    pub country: Option<String>,
    /// Destination city.
    pub city: Option<String>,
    /// Internal tour code; its first three characters name the airport.
    pub tour_code: Option<String>,
    /// First travel day, `YYYY-MM-DD`.
    pub departure_date: Option<String>,
    /// Customer or group name printed on the cover.
    pub client_name: Option<String>,
    /// Cover image URL.
    pub cover_image: Option<String>,
    /// Overview page image URL.
    pub overview_image: Option<String>,
    /// Emergency phone number.
    pub emergency_contact: Option<String>,
    /// Emergency email address.
    pub emergency_email: Option<String>,
    /// Outbound flight.
    pub outbound_flight: Option<FlightLeg>,
    /// Return flight.
    pub return_flight: Option<FlightLeg>,
    /// Tour leader.
    pub leader: Option<Leader>,
    /// Departure meeting point.
    pub meeting_info: Option<MeetingInfo>,
    /// One entry per travel day.
    pub daily_itinerary: Vec<ItineraryDay>,
    /// Hotels used on the trip.
    pub hotels: Vec<Hotel>,
}

impl Itinerary {
    /// Parse from provider JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of travel days.
    #[must_use]
    pub fn day_count(&self) -> usize {
        self.daily_itinerary.len()
    }
}

/// One flight leg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightLeg {
    /// Airline name.
    pub airline: Option<String>,
    /// Flight number.
    #[serde(alias = "flightNumber")]
    pub flight_number: Option<String>,
    /// Local departure time.
    #[serde(alias = "departureTime")]
    pub departure_time: Option<String>,
    /// Departure airport code.
    #[serde(alias = "departureAirport")]
    pub departure_airport: Option<String>,
    /// Local arrival time.
    #[serde(alias = "arrivalTime")]
    pub arrival_time: Option<String>,
    /// Arrival airport code.
    #[serde(alias = "arrivalAirport")]
    pub arrival_airport: Option<String>,
}

impl FlightLeg {
    /// `"<airline> <number>"`, trimmed.
    #[must_use]
    pub fn carrier_label(&self) -> String {
        join_present(&[self.airline.as_deref(), self.flight_number.as_deref()], " ")
    }

    /// `"<time> <airport> → <time> <airport>"`.
    #[must_use]
    pub fn route_label(&self) -> String {
        let from = join_present(
            &[self.departure_time.as_deref(), self.departure_airport.as_deref()],
            " ",
        );
        let to = join_present(
            &[self.arrival_time.as_deref(), self.arrival_airport.as_deref()],
            " ",
        );
        format!("{from} → {to}").trim().to_string()
    }
}

/// Tour leader contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Leader {
    /// Leader name.
    pub name: Option<String>,
    /// Domestic phone.
    #[serde(alias = "domesticPhone")]
    pub phone: Option<String>,
}

/// Departure meeting point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingInfo {
    /// Meeting time.
    pub time: Option<String>,
    /// Meeting location.
    pub location: Option<String>,
}

/// One scheduled activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    /// Activity title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Activity image URL.
    pub image: Option<String>,
}

/// A day image, either a bare URL or an object with a `url` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    /// Bare URL.
    Url(String),
    /// Object form.
    Object {
        /// Image URL.
        url: String,
    },
}

impl ImageRef {
    /// The image URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Object { url } => url,
        }
    }
}

/// One travel day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItineraryDay {
    /// Day title.
    pub title: Option<String>,
    /// One-line highlight.
    pub highlight: Option<String>,
    /// Free-text notes.
    pub description: Option<String>,
    /// Scheduled activities in order.
    pub activities: Vec<Activity>,
    /// Day images.
    pub images: Vec<ImageRef>,
}

/// A hotel stay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotel {
    /// Hotel name.
    pub name: String,
    /// Hotel image URL.
    pub image: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Front desk phone.
    pub phone: Option<String>,
    /// Check-in time.
    #[serde(alias = "checkIn")]
    pub check_in: Option<String>,
    /// Check-out time.
    #[serde(alias = "checkOut")]
    pub check_out: Option<String>,
    /// One-based trip days spent at this hotel.
    pub days: Vec<u32>,
}

impl Hotel {
    /// `"Day 2"` or `"Day 2-4"`; empty when no days are known.
    #[must_use]
    pub fn days_label(&self) -> String {
        match (self.days.first(), self.days.last()) {
            (Some(first), Some(last)) if first == last => format!("Day {first}"),
            (Some(first), Some(last)) => format!("Day {first}-{last}"),
            _ => String::new(),
        }
    }
}

fn join_present(parts: &[Option<&str>], sep: &str) -> String {
    parts
        .iter()
        .filter_map(|p| p.map(str::trim))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_json() {
        let json = r#"{
            "id": "trip-1",
            "country": "Japan",
            "city": "Kyoto",
            "outbound_flight": {"airline": "CI", "flightNumber": "152"},
            "daily_itinerary": [
                {"title": "Arrival", "images": ["a.jpg", {"url": "b.jpg"}]}
            ],
            "hotels": [{"name": "Ryokan", "checkIn": "15:00", "days": [1, 2]}]
        }"#;
        let itinerary = Itinerary::from_json(json).expect("parse");
        assert_eq!(itinerary.day_count(), 1);
        let day = &itinerary.daily_itinerary[0];
        assert_eq!(day.images[0].url(), "a.jpg");
        assert_eq!(day.images[1].url(), "b.jpg");
        let flight = itinerary.outbound_flight.expect("flight");
        assert_eq!(flight.carrier_label(), "CI 152");
        assert_eq!(itinerary.hotels[0].check_in.as_deref(), Some("15:00"));
    }

    #[test]
    fn test_hotel_days_label() {
        let mut hotel = Hotel {
            name: "Inn".into(),
            ..Hotel::default()
        };
        assert_eq!(hotel.days_label(), "");
        hotel.days = vec![3];
        assert_eq!(hotel.days_label(), "Day 3");
        hotel.days = vec![3, 4, 5];
        assert_eq!(hotel.days_label(), "Day 3-5");
    }

    #[test]
    fn test_route_label() {
        let leg = FlightLeg {
            departure_time: Some("08:00".into()),
            departure_airport: Some("TPE".into()),
            arrival_time: Some("12:00".into()),
            arrival_airport: Some("KIX".into()),
            ..FlightLeg::default()
        };
        assert_eq!(leg.route_label(), "08:00 TPE → 12:00 KIX");
    }
}
