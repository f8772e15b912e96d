//! 확장 필드 타입 변환
//!
//! 고정된 타입 표에 따라 키/값 쌍을 [`FieldValue`]로 변환합니다.
//! 사용자 정의 필드(`cs1`, `cn1`, `cfp1` 등)는 형제 필드 `<key>Label`의 값을
//! 출력 키로 사용합니다.
//!
//! 필드 하나의 변환 실패는 [`FieldWarning`]으로 모아 반환하고 해당 필드만 버립니다.

use std::borrow::Cow;

use cefpost_core::{FieldMap, FieldValue, FieldWarning, FieldWarningReason};
use indexmap::map::Entry;

use crate::error::CefParseError;
use crate::extension::ExtensionPairs;

/// 라벨 필드 접미어
pub const LABEL_SUFFIX: &str = "Label";

const NOT_FINITE: &str = "not a finite number";

/// 변환 대상 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int32,
    Int64,
    Float32,
    Float64,
    String,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
        }
    }

    /// 원본 문자열을 이 타입으로 변환합니다. 앞뒤 공백은 제거하지 않습니다.
    pub fn convert(&self, raw: &str) -> Result<FieldValue, FieldWarningReason> {
        let invalid = |detail: String| FieldWarningReason::InvalidNumber {
            target: self.as_str(),
            value: raw.to_owned(),
            detail,
        };

        match self {
            Self::Int32 => raw
                .parse()
                .map(FieldValue::Int)
                .map_err(|e| invalid(e.to_string())),
            Self::Int64 => raw
                .parse()
                .map(FieldValue::Long)
                .map_err(|e| invalid(e.to_string())),
            // 유한한 값만 숫자로 받는다 (`NaN`, `inf` 거부)
            Self::Float32 => match raw.parse::<f32>() {
                Ok(v) if v.is_finite() => Ok(FieldValue::Float(v)),
                Ok(_) => Err(invalid(NOT_FINITE.to_owned())),
                Err(e) => Err(invalid(e.to_string())),
            },
            Self::Float64 => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(FieldValue::Double(v)),
                Ok(_) => Err(invalid(NOT_FINITE.to_owned())),
                Err(e) => Err(invalid(e.to_string())),
            },
            Self::String => Ok(FieldValue::String(raw.to_owned())),
        }
    }
}

/// 타입 표의 한 행
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    /// 출력 키를 `<key>Label` 값으로 바꾸는지 여부
    pub labelled: bool,
}

const fn labelled(key: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        kind,
        labelled: true,
    }
}

const fn plain(key: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        kind,
        labelled: false,
    }
}

/// 고정 타입 표. 여기에 없는 키는 문자열로 유지됩니다.
pub static FIELD_SPECS: &[FieldSpec] = &[
    // IPv6 사용자 정의 주소
    labelled("c6a1", FieldKind::String),
    labelled("c6a2", FieldKind::String),
    labelled("c6a3", FieldKind::String),
    labelled("c6a4", FieldKind::String),
    // 사용자 정의 부동소수점
    labelled("cfp1", FieldKind::Float32),
    labelled("cfp2", FieldKind::Float32),
    labelled("cfp3", FieldKind::Float32),
    labelled("cfp4", FieldKind::Float32),
    // 사용자 정의 숫자
    labelled("cn1", FieldKind::Int64),
    labelled("cn2", FieldKind::Int64),
    labelled("cn3", FieldKind::Int64),
    labelled("flexNumber1", FieldKind::Int64),
    labelled("flexNumber2", FieldKind::Int64),
    // 사용자 정의 문자열
    labelled("cs1", FieldKind::String),
    labelled("cs2", FieldKind::String),
    labelled("cs3", FieldKind::String),
    labelled("cs4", FieldKind::String),
    labelled("cs5", FieldKind::String),
    labelled("cs6", FieldKind::String),
    labelled("flexString1", FieldKind::String),
    labelled("flexString2", FieldKind::String),
    // 날짜는 원문 그대로
    labelled("deviceCustomDate1", FieldKind::String),
    labelled("deviceCustomDate2", FieldKind::String),
    labelled("flexDate1", FieldKind::String),
    plain("cnt", FieldKind::Int32),
    plain("destinationTranslatedPort", FieldKind::Int32),
    plain("deviceDirection", FieldKind::Int32),
    plain("dpid", FieldKind::Int32),
    plain("dpt", FieldKind::Int32),
    plain("dvcpid", FieldKind::Int32),
    plain("fsize", FieldKind::Int32),
    plain("in", FieldKind::Int32),
    plain("oldFileSize", FieldKind::Int32),
    plain("sourceTranslatedPort", FieldKind::Int32),
    plain("spid", FieldKind::Int32),
    plain("spt", FieldKind::Int32),
    plain("type", FieldKind::Int32),
    plain("uid", FieldKind::Int32),
    plain("euid", FieldKind::Int32),
    plain("dlat", FieldKind::Float64),
    plain("dlong", FieldKind::Float64),
    plain("slat", FieldKind::Float64),
    plain("slong", FieldKind::Float64),
    plain("eventId", FieldKind::Int64),
];

/// 키에 해당하는 타입 표 행
pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    FIELD_SPECS.iter().find(|spec| spec.key == key)
}

/// 타입 변환 결과
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercedFields {
    pub fields: FieldMap,
    /// 버려진 필드마다 하나씩
    pub warnings: Vec<FieldWarning>,
}

/// 키/값 쌍을 타입이 지정된 필드 맵으로 변환합니다.
///
/// 라벨 치환 후 출력 키가 겹치면(`cs1Label=spt`와 `spt=22` 등) 메시지 전체가
/// `DuplicateKey`로 거부됩니다.
pub fn coerce(pairs: &ExtensionPairs<'_>) -> Result<CoercedFields, CefParseError> {
    let mut out = CoercedFields {
        fields: FieldMap::with_capacity(pairs.len()),
        warnings: Vec::new(),
    };

    for (key, raw) in pairs {
        let key = key.as_ref();

        let (output_key, kind) = match field_spec(key) {
            Some(spec) if spec.labelled => {
                let label_key = format!("{key}{LABEL_SUFFIX}");
                match pairs.get(label_key.as_str()) {
                    Some(label) => (Cow::Borrowed(label.as_ref()), spec.kind),
                    None => {
                        out.warnings.push(FieldWarning {
                            key: key.to_owned(),
                            reason: FieldWarningReason::MissingLabel { label_key },
                        });
                        continue;
                    }
                }
            }
            Some(spec) => (Cow::Borrowed(key), spec.kind),
            None if key.ends_with(LABEL_SUFFIX) => continue,
            None => (Cow::Borrowed(key), FieldKind::String),
        };

        let value = match kind.convert(raw) {
            Ok(value) => value,
            Err(reason) => {
                out.warnings.push(FieldWarning {
                    key: key.to_owned(),
                    reason,
                });
                continue;
            }
        };

        match out.fields.entry(output_key.into_owned()) {
            Entry::Occupied(entry) => {
                return Err(CefParseError::DuplicateKey {
                    key: entry.key().clone(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::tokenize;

    fn coerce_str(payload: &str) -> CoercedFields {
        coerce(&tokenize(payload).unwrap()).unwrap()
    }

    #[test]
    fn table_has_unique_keys() {
        for (i, spec) in FIELD_SPECS.iter().enumerate() {
            assert!(
                FIELD_SPECS[i + 1..].iter().all(|other| other.key != spec.key),
                "duplicate {}",
                spec.key
            );
        }
    }

    #[test]
    fn labelled_fields_are_renamed() {
        let out = coerce_str(
            "c6a1=2001:db8::1 c6a1Label=TestTest1 cfp2=90.01 cfp2Label=TestTest2 \
             cn1=999999999999 cn1Label=TestTest3 flexNumber2=42 flexNumber2Label=TestTest4 \
             cs5=hello cs5Label=TestTest5 flexString1=world flexString1Label=TestTest6 \
             deviceCustomDate1=Aug 14 2016 14:26:55 deviceCustomDate1Label=TestTest7 \
             flexDate1=2016-08-14 flexDate1Label=TestTest8",
        );
        let f = &out.fields;
        assert_eq!(f["TestTest1"], FieldValue::from("2001:db8::1"));
        assert_eq!(f["TestTest2"], FieldValue::Float(90.01));
        assert_eq!(f["TestTest3"], FieldValue::Long(999_999_999_999));
        assert_eq!(f["TestTest4"], FieldValue::Long(42));
        assert_eq!(f["TestTest5"], FieldValue::from("hello"));
        assert_eq!(f["TestTest6"], FieldValue::from("world"));
        assert_eq!(f["TestTest7"], FieldValue::from("Aug 14 2016 14:26:55"));
        assert_eq!(f["TestTest8"], FieldValue::from("2016-08-14"));
        assert_eq!(f.len(), 8);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn standard_int_fields() {
        let out = coerce_str(
            "cnt=3 destinationTranslatedPort=22 deviceDirection=1 dpid=9001 dpt=3342 \
             dvcpid=900 fsize=12 in=543 oldFileSize=1000 sourceTranslatedPort=443 \
             spid=5516 spt=22 type=0",
        );
        let f = &out.fields;
        assert_eq!(f["cnt"], FieldValue::Int(3));
        assert_eq!(f["destinationTranslatedPort"], FieldValue::Int(22));
        assert_eq!(f["deviceDirection"], FieldValue::Int(1));
        assert_eq!(f["dpid"], FieldValue::Int(9001));
        assert_eq!(f["dpt"], FieldValue::Int(3342));
        assert_eq!(f["dvcpid"], FieldValue::Int(900));
        assert_eq!(f["fsize"], FieldValue::Int(12));
        assert_eq!(f["in"], FieldValue::Int(543));
        assert_eq!(f["oldFileSize"], FieldValue::Int(1000));
        assert_eq!(f["sourceTranslatedPort"], FieldValue::Int(443));
        assert_eq!(f["spid"], FieldValue::Int(5516));
        assert_eq!(f["spt"], FieldValue::Int(22));
        assert_eq!(f["type"], FieldValue::Int(0));
    }

    #[test]
    fn double_and_long_fields() {
        let out = coerce_str("slat=29.7604 slong=95.3698 dlat=53.5511 dlong=9.9937 eventId=9001");
        let f = &out.fields;
        assert_eq!(f["slat"], FieldValue::Double(29.7604));
        assert_eq!(f["slong"], FieldValue::Double(95.3698));
        assert_eq!(f["dlat"], FieldValue::Double(53.5511));
        assert_eq!(f["dlong"], FieldValue::Double(9.9937));
        assert_eq!(f["eventId"], FieldValue::Long(9001));
    }

    #[test]
    fn label_may_precede_field() {
        let out = coerce_str("cs2Label=Location cs2=ip-172-30-2-212 -> /var/log/auth.log");
        assert_eq!(
            out.fields["Location"],
            FieldValue::from("ip-172-30-2-212 -> /var/log/auth.log")
        );
        assert!(!out.fields.contains_key("cs2"));
        assert!(!out.fields.contains_key("cs2Label"));
    }

    #[test]
    fn orphan_label_fields_are_dropped() {
        let out = coerce_str("customLabel=x dvc=host");
        assert_eq!(out.fields.len(), 1);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn missing_label_drops_field_with_warning() {
        let out = coerce_str("cn1=5 dvc=host");
        assert!(!out.fields.contains_key("cn1"));
        assert_eq!(out.fields["dvc"], FieldValue::from("host"));
        assert_eq!(
            out.warnings,
            vec![FieldWarning {
                key: "cn1".to_owned(),
                reason: FieldWarningReason::MissingLabel {
                    label_key: "cn1Label".to_owned(),
                },
            }]
        );
    }

    #[test]
    fn bad_numbers_drop_field_with_warning() {
        let out = coerce_str("spt=  22    cnt=99999999999 cfp1=abc cfp1Label=Ratio dvc=host");
        assert_eq!(out.fields.len(), 1);
        assert_eq!(out.warnings.len(), 3);
        let keys: Vec<&str> = out.warnings.iter().map(|w| w.key.as_str()).collect();
        assert_eq!(keys, vec!["spt", "cnt", "cfp1"]);
        assert!(matches!(
            &out.warnings[1].reason,
            FieldWarningReason::InvalidNumber { target: "int32", .. }
        ));
    }

    #[test]
    fn non_finite_floats_drop_field_with_warning() {
        let out = coerce_str("cfp1=NaN cfp1Label=Ratio slat=inf dlat=Infinity dlong=-inf cfp2=1e39 cfp2Label=Big");
        assert!(out.fields.is_empty(), "unexpected fields {:?}", out.fields);
        let keys: Vec<&str> = out.warnings.iter().map(|w| w.key.as_str()).collect();
        assert_eq!(keys, vec!["cfp1", "slat", "dlat", "dlong", "cfp2"]);
        assert!(out.warnings.iter().all(|w| matches!(
            &w.reason,
            FieldWarningReason::InvalidNumber { detail, .. } if detail == NOT_FINITE
        )));
    }

    #[test]
    fn unknown_keys_stay_strings() {
        let out = coerce_str("dvc=ip-172-30-2-212 msg=hello world");
        assert_eq!(out.fields["dvc"], FieldValue::from("ip-172-30-2-212"));
        assert_eq!(out.fields["msg"], FieldValue::from("hello world"));
    }

    #[test]
    fn renamed_key_collision_is_fatal() {
        let pairs = tokenize("spt=22 cs1=x cs1Label=spt").unwrap();
        let err = coerce(&pairs).unwrap_err();
        assert_eq!(err, CefParseError::DuplicateKey { key: "spt".to_owned() });
    }

    #[test]
    fn output_follows_source_order() {
        let out = coerce_str("spt=22 cs1=x dvc=h cs1Label=Name");
        let keys: Vec<&str> = out.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["spt", "Name", "dvc"]);
    }
}
