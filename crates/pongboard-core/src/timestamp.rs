// "Last updated" helpers: probing a file's modification time and rendering it
// for display.

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use crate::source::parse_http_date;
use crate::transport::HttpTransport;

/// Modification time of `url` without downloading it when possible.
///
/// Tries HEAD first and falls back to GET when the HEAD response carries no
/// `Last-Modified` header. Any failure yields `None`.
pub async fn remote_last_modified(
    transport: &dyn HttpTransport,
    url: &str,
) -> Option<DateTime<Utc>> {
    match transport.head(url).await {
        Ok(response) => {
            if let Some(raw) = response.last_modified.as_deref() {
                return parse_http_date(url, raw);
            }
        }
        Err(e) => {
            warn!(url, "HEAD request failed: {e}");
            return None;
        }
    }

    match transport.get(url).await {
        Ok(response) => response
            .last_modified
            .as_deref()
            .and_then(|raw| parse_http_date(url, raw)),
        Err(e) => {
            warn!(url, "GET request failed: {e}");
            None
        }
    }
}

/// `"Dernière mise à jour: 27/01/2026 à 14:30"`, in the timezone of `date`.
pub fn format_last_update<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Dernière mise à jour: {} à {}",
        date.format("%d/%m/%Y"),
        date.format("%H:%M")
    )
}

/// Short French relative time ("il y a 5 min"), falling back to the full
/// [`format_last_update`] text after a week.
pub fn relative_time(date: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*date);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "à l'instant".to_string()
    } else if minutes < 60 {
        format!("il y a {minutes} min")
    } else if hours < 24 {
        format!("il y a {hours}h")
    } else if days < 7 {
        format!("il y a {days}j")
    } else {
        format_last_update(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, StaticTransport};
    use chrono::Duration;

    const HEADER: &str = "Tue, 27 Jan 2026 14:30:00 GMT";

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 27, h, m, 0).unwrap()
    }

    // -- Formatting --

    #[test]
    fn last_update_format() {
        assert_eq!(
            format_last_update(&at(14, 30)),
            "Dernière mise à jour: 27/01/2026 à 14:30"
        );
    }

    #[test]
    fn relative_time_buckets() {
        let date = at(10, 0);
        assert_eq!(relative_time(&date, &(date + Duration::seconds(30))), "à l'instant");
        assert_eq!(relative_time(&date, &(date + Duration::minutes(5))), "il y a 5 min");
        assert_eq!(relative_time(&date, &(date + Duration::hours(3))), "il y a 3h");
        assert_eq!(relative_time(&date, &(date + Duration::days(2))), "il y a 2j");
        assert_eq!(
            relative_time(&date, &(date + Duration::days(8))),
            "Dernière mise à jour: 27/01/2026 à 10:00"
        );
    }

    #[test]
    fn future_dates_read_as_just_now() {
        let date = at(10, 0);
        assert_eq!(relative_time(&date, &at(9, 0)), "à l'instant");
    }

    // -- Probing --

    #[tokio::test]
    async fn head_used_when_header_present() {
        let transport = StaticTransport::new();
        transport.serve("u", HttpResponse::ok("a\n1\n").last_modified(HEADER));

        assert_eq!(remote_last_modified(&transport, "u").await, Some(at(14, 30)));
        assert_eq!(transport.head_count("u"), 1);
        assert_eq!(transport.get_count("u"), 0);
    }

    #[tokio::test]
    async fn falls_back_to_get() {
        let transport = StaticTransport::new();
        transport.serve("u", HttpResponse::ok("a\n1\n").last_modified(HEADER));
        transport.serve_head("u", HttpResponse::ok(""));

        assert_eq!(remote_last_modified(&transport, "u").await, Some(at(14, 30)));
        assert_eq!(transport.get_count("u"), 1);
    }

    #[tokio::test]
    async fn missing_header_is_none() {
        let transport = StaticTransport::new();
        transport.serve("u", HttpResponse::ok("a\n1\n"));
        assert_eq!(remote_last_modified(&transport, "u").await, None);
    }

    #[tokio::test]
    async fn transport_failure_is_none() {
        let transport = StaticTransport::new();
        transport.fail("u", "offline");
        assert_eq!(remote_last_modified(&transport, "u").await, None);
        assert_eq!(transport.get_count("u"), 0);
    }
}
