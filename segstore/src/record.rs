//! Pipe-delimited line codec for segment records.

use chrono::{DateTime, Utc};

use trendseg::{EngineConfig, SchemaType, Segment, TrendDirection, fallback_points_in_region};

const ABSENT: &str = "-";

pub fn encode_segment(segment: &Segment) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        segment.id,
        segment.series_id,
        segment.direction.as_str(),
        segment.x0.timestamp_millis(),
        segment.min_price,
        segment.max_price,
        segment.average_price,
        segment.original_point_count,
        segment.point_count,
        segment.points_in_region,
        segment.red_point_count,
        segment.green_point_count,
        segment.schema.as_str(),
        encode_opt_millis(segment.pattern_point),
        segment.start_index,
        segment.end_index,
        encode_opt_bool(segment.is_result_correct),
        encode_opt_str(segment.result_interval.as_deref()),
        encode_opt_str(segment.ml_model_name.as_deref()),
        encode_opt_str(segment.ml_classed.as_deref()),
    )
}

pub fn decode_segment(line: &str) -> Option<Segment> {
    let mut parts = line.split('|');
    let id = parts.next()?.to_string();
    let series_id = parts.next()?.to_string();
    let direction = TrendDirection::parse(parts.next()?).ok()?;
    let x0_millis = parts.next()?.parse::<i64>().ok()?;
    let min_price = parts.next()?.parse::<f64>().ok()?;
    let max_price = parts.next()?.parse::<f64>().ok()?;
    let average_price = parts.next()?.parse::<f64>().ok()?;
    let original_point_count = parts.next()?.parse::<usize>().ok()?;
    let point_count = parts.next()?.parse::<usize>().ok()?;
    // Legacy records predate the in-region column; they get the documented
    // ratio estimate instead of being dropped.
    let points_in_region = match parts.next()? {
        ABSENT => fallback_points_in_region(point_count, EngineConfig::default().fallback_ratio),
        raw => raw.parse::<usize>().ok()?,
    };
    let red_point_count = parts.next()?.parse::<usize>().ok()?;
    let green_point_count = parts.next()?.parse::<usize>().ok()?;
    let schema = SchemaType::parse(parts.next()?).ok()?;
    let pattern_point = decode_opt_millis(parts.next()?)?;
    let start_index = parts.next()?.parse::<usize>().ok()?;
    let end_index = parts.next()?.parse::<usize>().ok()?;
    let is_result_correct = decode_opt_bool(parts.next()?)?;
    let result_interval = decode_opt_str(parts.next()?);
    let ml_model_name = decode_opt_str(parts.next()?);
    let ml_classed = decode_opt_str(parts.next()?);

    let x0 = DateTime::<Utc>::from_timestamp_millis(x0_millis)?;

    Some(Segment {
        id,
        series_id,
        direction,
        x0,
        min_price,
        max_price,
        average_price,
        original_point_count,
        point_count,
        points_in_region,
        red_point_count,
        green_point_count,
        schema,
        pattern_point,
        start_index,
        end_index,
        is_result_correct,
        result_interval,
        ml_model_name,
        ml_classed,
    })
}

fn encode_opt_millis(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|v| v.timestamp_millis().to_string())
        .unwrap_or_else(|| ABSENT.to_string())
}

// Outer None means a malformed field, inner None means "absent".
fn decode_opt_millis(raw: &str) -> Option<Option<DateTime<Utc>>> {
    if raw == ABSENT {
        return Some(None);
    }
    let millis = raw.parse::<i64>().ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis).map(Some)
}

fn encode_opt_bool(value: Option<bool>) -> String {
    match value {
        Some(true) => "1".to_string(),
        Some(false) => "0".to_string(),
        None => ABSENT.to_string(),
    }
}

fn decode_opt_bool(raw: &str) -> Option<Option<bool>> {
    match raw {
        ABSENT => Some(None),
        "1" => Some(Some(true)),
        "0" => Some(Some(false)),
        _ => None,
    }
}

// The delimiter and the absent marker are escaped so that any stored value
// survives a decode unchanged.
fn encode_opt_str(value: Option<&str>) -> String {
    match value {
        Some(v) => {
            let escaped = v.replace('\\', "\\\\").replace('|', "\\p");
            if escaped == ABSENT {
                "\\-".to_string()
            } else {
                escaped
            }
        }
        None => ABSENT.to_string(),
    }
}

fn decode_opt_str(raw: &str) -> Option<String> {
    if raw == ABSENT || raw.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('p') => out.push('|'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{decode_segment, encode_segment};
    use trendseg::{SchemaType, Segment, TrendDirection};

    fn sample() -> Segment {
        Segment {
            id: "ACA_2024-03-15_000".to_string(),
            series_id: "ACA_2024-03-15".to_string(),
            direction: TrendDirection::Up,
            x0: Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            min_price: 10.3,
            max_price: 11.2,
            average_price: 10.7,
            original_point_count: 30,
            point_count: 24,
            points_in_region: 15,
            red_point_count: 8,
            green_point_count: 14,
            schema: SchemaType::R,
            pattern_point: None,
            start_index: 3,
            end_index: 26,
            is_result_correct: Some(true),
            result_interval: Some("09:00-10:00".to_string()),
            ml_model_name: None,
            ml_classed: None,
        }
    }

    #[test]
    fn decode_inverts_encode() {
        let segment = sample();
        let decoded = decode_segment(&encode_segment(&segment)).expect("record should decode");
        assert_eq!(decoded, segment);
    }

    #[test]
    fn truncated_record_is_rejected() {
        let line = encode_segment(&sample());
        let truncated = &line[..line.len() / 2];
        assert!(decode_segment(truncated).is_none());
    }

    #[test]
    fn delimiter_and_sentinel_payloads_round_trip() {
        let mut segment = sample();
        segment.result_interval = Some("09:00|10:00".to_string());
        segment.ml_model_name = Some("-".to_string());
        segment.ml_classed = Some("v\\r|mixed".to_string());

        let line = encode_segment(&segment);
        // The raw line still splits into exactly 20 fields.
        assert_eq!(line.split('|').count(), 20);

        let decoded = decode_segment(&line).expect("record should decode");
        assert_eq!(decoded, segment);
    }

    #[test]
    fn legacy_record_without_in_region_gets_ratio_estimate() {
        let mut segment = sample();
        let mut line = encode_segment(&segment);
        line = line.replacen("|15|", "|-|", 1);

        let decoded = decode_segment(&line).expect("legacy record should decode");
        // ceil(0.6 * 24)
        assert_eq!(decoded.points_in_region, 15);
        segment.points_in_region = 15;
        assert_eq!(decoded, segment);
    }
}
