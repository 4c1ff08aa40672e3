use chrono::TimeZone;
use chrono_tz::{America, Europe, Tz};
use oxrecur_core::freebusy::{FreeBusyData, FreeBusyType, generate_vfreebusy, merge_slots};
use oxrecur_core::pattern::{generate_pattern, parse_pattern};
use oxrecur_core::rrule::{generate_rrule, parse_rrule};
use oxrecur_core::{RecurrenceType, SeriesEnd};
use rrule::RRuleSet;

const PATTERNS: &[&str] = &[
    "t|1|i|1|s|1222865100000|",
    "t|1|i|3|s|1222865100000|o|10|",
    "t|2|i|1|a|8|s|1222840800000|",
    "t|2|i|2|a|62|s|1222840800000|e|1230681600000|",
    "t|3|i|1|b|15|s|1222840800000|",
    "t|3|i|1|a|32|b|2|s|1222840800000|o|6|",
    "t|3|i|2|a|8|b|5|s|1222840800000|e|1254268800000|",
    "t|4|i|1|b|24|c|11|s|1222840800000|",
    "t|4|i|1|a|16|b|4|c|10|s|1222840800000|o|3|",
];

const ZONES: &[Tz] = &[Tz::UTC, Europe::Berlin, America::New_York];

#[test]
fn pattern_survives_rrule_roundtrip() {
    for input in PATTERNS {
        for tz in ZONES {
            let pattern = parse_pattern(input).unwrap();
            let rrule = generate_rrule(&pattern, *tz).unwrap();

            let reference = pattern.start.unwrap().with_timezone(tz);
            let reparsed = parse_rrule(&rrule, reference)
                .unwrap_or_else(|e| panic!("{input} -> {rrule} ({tz}): {e}"));

            assert_eq!(reparsed, pattern, "{input} -> {rrule} ({tz})");
            assert_eq!(generate_pattern(&reparsed).unwrap(), *input);
        }
    }
}

#[test]
fn generated_rrules_are_accepted_by_rrule_crate() {
    for input in PATTERNS {
        for tz in ZONES {
            let pattern = parse_pattern(input).unwrap();
            let rrule = generate_rrule(&pattern, *tz).unwrap();
            let start = pattern.start.unwrap().with_timezone(tz);

            let rrule_set = format!(
                "DTSTART;TZID={}:{}\nRRULE:{}",
                tz.name(),
                start.format("%Y%m%dT%H%M%S"),
                rrule
            );

            let parsed: Result<RRuleSet, _> = rrule_set.parse();
            assert!(parsed.is_ok(), "{rrule_set}: {:?}", parsed.err());
        }
    }
}

#[test]
fn count_and_until_are_exclusive_in_output() {
    let counted = generate_rrule(&parse_pattern("t|1|i|1|s|1222865100000|o|3|").unwrap(), Tz::UTC)
        .unwrap();
    assert!(counted.contains("COUNT=3"));
    assert!(!counted.contains("UNTIL"));

    let until = parse_pattern("t|1|i|1|s|1222865100000|e|1225411200000|").unwrap();
    let rrule = generate_rrule(&until, Europe::Berlin).unwrap();
    assert!(rrule.contains("UNTIL=20081030T230000Z"));
    assert!(!rrule.contains("COUNT"));
    assert!(matches!(until.end, Some(SeriesEnd::Until(_))));
}

#[test]
fn client_rrule_becomes_persisted_pattern() {
    let reference = Europe::Berlin
        .timestamp_millis_opt(1222840800000)
        .single()
        .unwrap();
    let pattern = parse_rrule("FREQ=MONTHLY;BYDAY=2FR;COUNT=4", reference).unwrap();

    assert_eq!(pattern.kind, RecurrenceType::MonthlyByWeekday);
    assert_eq!(
        generate_pattern(&pattern).unwrap(),
        "t|3|i|1|a|32|b|2|s|1222840800000|o|4|"
    );
}

#[test]
fn freebusy_json_input_generates_merged_vfreebusy() {
    let json = r#"{
        "uid": "fb-json@oxrecur",
        "organizer": { "name": "Alice", "email": "alice@example.com" },
        "start": "2025-03-20T00:00:00Z",
        "end": "2025-03-21T00:00:00Z",
        "dtstamp": "2025-03-19T12:00:00Z",
        "slots": [
            { "start": "2025-03-20T09:00:00Z", "end": "2025-03-20T10:00:00Z" },
            { "start": "2025-03-20T09:30:00Z", "end": "2025-03-20T11:00:00Z" },
            { "start": "2025-03-20T14:00:00Z", "end": "2025-03-20T15:00:00Z", "fb_type": "busy_tentative" }
        ]
    }"#;

    let mut data: FreeBusyData = serde_json::from_str(json).unwrap();
    assert_eq!(data.slots[0].fb_type, FreeBusyType::Busy);
    assert!(data.attendees.is_empty());

    data.slots = merge_slots(&data.slots);
    assert_eq!(data.slots.len(), 2);

    let ics = generate_vfreebusy(&data).unwrap();
    assert!(ics.contains("FREEBUSY;FBTYPE=BUSY:20250320T090000Z/20250320T110000Z\r\n"));
    assert!(
        ics.contains("FREEBUSY;FBTYPE=BUSY-TENTATIVE:20250320T140000Z/20250320T150000Z\r\n")
    );
    assert!(ics.contains("DTSTAMP:20250319T120000Z\r\n"));
}
