//! Wire format for the persisted progress pair.
//!
//! `quiz-answers` is a JSON object mapping stringified question id to the
//! selected option index; `quiz-time` is a decimal string of remaining
//! seconds. Decoding fails soft: a malformed payload decodes to `None` and
//! is treated as "nothing saved".

use std::collections::BTreeMap;

use exam_core::model::QuestionId;

use crate::repository::StorageError;

pub(crate) fn encode_answers(answers: &[(QuestionId, usize)]) -> Result<String, StorageError> {
    let map: BTreeMap<String, usize> = answers
        .iter()
        .map(|(id, index)| (id.to_string(), *index))
        .collect();
    serde_json::to_string(&map).map_err(|err| StorageError::Serialization(err.to_string()))
}

pub(crate) fn decode_answers(raw: &str) -> Option<Vec<(QuestionId, usize)>> {
    let map: BTreeMap<String, usize> = serde_json::from_str(raw).ok()?;
    let mut answers = Vec::with_capacity(map.len());
    for (key, index) in map {
        let id: QuestionId = key.parse().ok()?;
        answers.push((id, index));
    }
    Some(answers)
}

pub(crate) fn encode_time(remaining_secs: u32) -> String {
    remaining_secs.to_string()
}

pub(crate) fn decode_time(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_round_trip() {
        let answers = vec![
            (QuestionId::new(1), 0),
            (QuestionId::new(2), 3),
            (QuestionId::new(10), 1),
        ];
        let raw = encode_answers(&answers).unwrap();
        let mut decoded = decode_answers(&raw).unwrap();
        decoded.sort_by_key(|(id, _)| *id);
        assert_eq!(decoded, answers);
    }

    #[test]
    fn answers_encode_ids_as_string_keys() {
        let raw = encode_answers(&[(QuestionId::new(3), 2)]).unwrap();
        assert_eq!(raw, r#"{"3":2}"#);
    }

    #[test]
    fn malformed_answers_decode_to_none() {
        assert!(decode_answers("not json").is_none());
        assert!(decode_answers(r#"{"abc":1}"#).is_none());
        assert!(decode_answers(r#"{"1":"x"}"#).is_none());
        assert!(decode_answers("[1,2,3]").is_none());
    }

    #[test]
    fn time_round_trip_and_failures() {
        assert_eq!(decode_time(&encode_time(42)), Some(42));
        assert_eq!(decode_time("0"), Some(0));
        assert_eq!(decode_time(""), None);
        assert_eq!(decode_time("-5"), None);
        assert_eq!(decode_time("soon"), None);
    }
}
