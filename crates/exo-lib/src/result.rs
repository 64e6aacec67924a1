use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Evaluation of the stacked meta-model as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaModelEvaluation {
    #[serde(default, deserialize_with = "lenient_number")]
    pub auc: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub precision: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub recall: Option<f64>,
}

/// Successful analysis payload. Every field is optional; unknown fields are
/// ignored and a field of the wrong type reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_evaluation")]
    pub meta_model_evaluation: Option<MetaModelEvaluation>,
    /// Base64 PNG of the confusion matrix.
    #[serde(default, deserialize_with = "lenient_string")]
    pub cm_image: Option<String>,
    /// Base64 PNG of the SHAP summary plot.
    #[serde(default, deserialize_with = "lenient_string")]
    pub shap_image: Option<String>,
}

impl AnalysisResult {
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Strings as-is; numbers and booleans by their JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_evaluation<'de, D>(deserializer: D) -> Result<Option<MetaModelEvaluation>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_payload() {
        let body = br#"{"status":"Success","meta_model_evaluation":{"auc":0.91,"precision":0.88,"recall":0.84},"cm_image":"AAAA","shap_image":"BBBB"}"#;
        let result = AnalysisResult::from_json(body).unwrap();
        assert_eq!(result.status.as_deref(), Some("Success"));
        let eval = result.meta_model_evaluation.unwrap();
        assert_eq!(eval.auc, Some(0.91));
        assert_eq!(eval.recall, Some(0.84));
        assert_eq!(result.cm_image.as_deref(), Some("AAAA"));
    }

    #[test]
    fn tolerates_missing_and_extra_fields() {
        let body = br#"{"message":"trained","meta_model_evaluation":{"auc":null}}"#;
        let result = AnalysisResult::from_json(body).unwrap();
        assert!(result.status.is_none());
        assert_eq!(result.meta_model_evaluation, Some(MetaModelEvaluation::default()));
        assert!(result.shap_image.is_none());
    }

    #[test]
    fn wrong_typed_metric_reads_as_absent() {
        let body = br#"{"status":"Success","meta_model_evaluation":{"auc":"N/A","precision":0.88,"recall":[1]},"cm_image":"aGVsbG8=","shap_image":"d29ybGQ="}"#;
        let result = AnalysisResult::from_json(body).unwrap();
        let eval = result.meta_model_evaluation.unwrap();
        assert_eq!(eval.auc, None);
        assert_eq!(eval.precision, Some(0.88));
        assert_eq!(eval.recall, None);
        assert_eq!(result.cm_image.as_deref(), Some("aGVsbG8="));
        assert_eq!(result.shap_image.as_deref(), Some("d29ybGQ="));
    }

    #[test]
    fn numeric_status_is_kept_as_text() {
        let body = br#"{"status":200,"meta_model_evaluation":"pending","cm_image":42,"shap_image":"d29ybGQ="}"#;
        let result = AnalysisResult::from_json(body).unwrap();
        assert_eq!(result.status.as_deref(), Some("200"));
        assert!(result.meta_model_evaluation.is_none());
        assert!(result.cm_image.is_none());
        assert_eq!(result.shap_image.as_deref(), Some("d29ybGQ="));
    }

    #[test]
    fn rejects_non_object_body() {
        assert!(AnalysisResult::from_json(b"<html>oops</html>").is_err());
        assert!(AnalysisResult::from_json(b"[1, 2]").is_err());
    }
}
