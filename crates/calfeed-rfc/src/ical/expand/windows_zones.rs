//! Windows time zone display names ("Eastern Time (US & Canada)") to IANA ids.
//!
//! Outlook and Exchange publish these as `TZID` values, usually prefixed with
//! the `(UTC±HH:MM)` offset, which is stripped before lookup. Windows zone
//! *ids* ("Eastern Standard Time") are handled by ICU instead.

use std::collections::HashMap;
use std::sync::LazyLock;

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("International Date Line West", "Etc/GMT+12"),
    ("Coordinated Universal Time-11", "Etc/GMT+11"),
    ("Hawaii", "Pacific/Honolulu"),
    ("Alaska", "America/Anchorage"),
    ("Baja California", "America/Tijuana"),
    ("Pacific Time (US & Canada)", "America/Los_Angeles"),
    ("Arizona", "America/Phoenix"),
    ("Chihuahua, La Paz, Mazatlan", "America/Chihuahua"),
    ("Mountain Time (US & Canada)", "America/Denver"),
    ("Central America", "America/Guatemala"),
    ("Central Time (US & Canada)", "America/Chicago"),
    ("Guadalajara, Mexico City, Monterrey", "America/Mexico_City"),
    ("Saskatchewan", "America/Regina"),
    ("Bogota, Lima, Quito, Rio Branco", "America/Bogota"),
    ("Eastern Time (US & Canada)", "America/New_York"),
    ("Indiana (East)", "America/Indiana/Indianapolis"),
    ("Atlantic Time (Canada)", "America/Halifax"),
    ("Caracas", "America/Caracas"),
    ("Georgetown, La Paz, Manaus, San Juan", "America/La_Paz"),
    ("Santiago", "America/Santiago"),
    ("Newfoundland", "America/St_Johns"),
    ("Brasilia", "America/Sao_Paulo"),
    ("City of Buenos Aires", "America/Argentina/Buenos_Aires"),
    ("Buenos Aires", "America/Argentina/Buenos_Aires"),
    ("Greenland", "America/Nuuk"),
    ("Montevideo", "America/Montevideo"),
    ("Coordinated Universal Time-02", "Etc/GMT+2"),
    ("Azores", "Atlantic/Azores"),
    ("Cabo Verde Is.", "Atlantic/Cape_Verde"),
    ("Coordinated Universal Time", "Etc/UTC"),
    ("Dublin, Edinburgh, Lisbon, London", "Europe/London"),
    ("Monrovia, Reykjavik", "Atlantic/Reykjavik"),
    ("Casablanca", "Africa/Casablanca"),
    ("Amsterdam, Berlin, Bern, Rome, Stockholm, Vienna", "Europe/Berlin"),
    ("Belgrade, Bratislava, Budapest, Ljubljana, Prague", "Europe/Budapest"),
    ("Brussels, Copenhagen, Madrid, Paris", "Europe/Paris"),
    ("Sarajevo, Skopje, Warsaw, Zagreb", "Europe/Warsaw"),
    ("West Central Africa", "Africa/Lagos"),
    ("Amman", "Asia/Amman"),
    ("Athens, Bucharest", "Europe/Bucharest"),
    ("Beirut", "Asia/Beirut"),
    ("Cairo", "Africa/Cairo"),
    ("Harare, Pretoria", "Africa/Johannesburg"),
    ("Helsinki, Kyiv, Riga, Sofia, Tallinn, Vilnius", "Europe/Kyiv"),
    ("Helsinki, Kiev, Riga, Sofia, Tallinn, Vilnius", "Europe/Kyiv"),
    ("Jerusalem", "Asia/Jerusalem"),
    ("Baghdad", "Asia/Baghdad"),
    ("Istanbul", "Europe/Istanbul"),
    ("Kuwait, Riyadh", "Asia/Riyadh"),
    ("Moscow, St. Petersburg", "Europe/Moscow"),
    ("Moscow, St. Petersburg, Volgograd", "Europe/Moscow"),
    ("Nairobi", "Africa/Nairobi"),
    ("Tehran", "Asia/Tehran"),
    ("Abu Dhabi, Muscat", "Asia/Dubai"),
    ("Baku", "Asia/Baku"),
    ("Kabul", "Asia/Kabul"),
    ("Islamabad, Karachi", "Asia/Karachi"),
    ("Tashkent", "Asia/Tashkent"),
    ("Chennai, Kolkata, Mumbai, New Delhi", "Asia/Kolkata"),
    ("Sri Jayawardenepura", "Asia/Colombo"),
    ("Kathmandu", "Asia/Kathmandu"),
    ("Astana", "Asia/Almaty"),
    ("Dhaka", "Asia/Dhaka"),
    ("Yangon (Rangoon)", "Asia/Yangon"),
    ("Bangkok, Hanoi, Jakarta", "Asia/Bangkok"),
    ("Beijing, Chongqing, Hong Kong, Urumqi", "Asia/Shanghai"),
    ("Kuala Lumpur, Singapore", "Asia/Singapore"),
    ("Perth", "Australia/Perth"),
    ("Taipei", "Asia/Taipei"),
    ("Osaka, Sapporo, Tokyo", "Asia/Tokyo"),
    ("Seoul", "Asia/Seoul"),
    ("Adelaide", "Australia/Adelaide"),
    ("Darwin", "Australia/Darwin"),
    ("Brisbane", "Australia/Brisbane"),
    ("Canberra, Melbourne, Sydney", "Australia/Sydney"),
    ("Hobart", "Australia/Hobart"),
    ("Guam, Port Moresby", "Pacific/Port_Moresby"),
    ("Vladivostok", "Asia/Vladivostok"),
    ("Auckland, Wellington", "Pacific/Auckland"),
    ("Fiji", "Pacific/Fiji"),
    ("Nuku'alofa", "Pacific/Tongatapu"),
    ("Samoa", "Pacific/Apia"),
];

static DISPLAY_NAME_TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| DISPLAY_NAMES.iter().copied().collect());

/// ## Summary
/// Looks up a Windows display name, already stripped of its offset prefix.
#[must_use]
pub fn lookup_display_name(name: &str) -> Option<&'static str> {
    DISPLAY_NAME_TABLE.get(name).copied()
}

/// ## Summary
/// Strips a leading `(UTC±HH:MM) `, `(UTC) ` or `(GMT±HH:MM) ` prefix.
///
/// Returns the label unchanged when it does not start with such a prefix.
#[must_use]
pub fn strip_offset_prefix(label: &str) -> &str {
    let Some(rest) = label
        .strip_prefix("(UTC")
        .or_else(|| label.strip_prefix("(GMT"))
    else {
        return label;
    };
    let Some(close) = rest.find(')') else {
        return label;
    };

    let offset = &rest[..close];
    if !offset.is_empty() && !is_offset(offset) {
        return label;
    }

    rest[close + 1..].trim_start()
}

/// `±HH:MM` or `±HH`
fn is_offset(s: &str) -> bool {
    let Some(digits) = s.strip_prefix(['+', '-', '\u{2212}']) else {
        return false;
    };
    let (hours, minutes) = digits.split_once(':').unwrap_or((digits, "00"));
    hours.len() == 2
        && minutes.len() == 2
        && hours.bytes().all(|b| b.is_ascii_digit())
        && minutes.bytes().all(|b| b.is_ascii_digit())
}
