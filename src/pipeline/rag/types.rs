use serde::{Deserialize, Serialize};

/// Number of passages retrieved from the knowledge base per question.
pub const NUMBER_OF_RESULTS: i32 = 5;
/// Decoding temperature for the generation model.
pub const TEMPERATURE: f32 = 0.2;
/// Maximum number of tokens in a generated answer.
pub const MAX_TOKENS: i32 = 1024;
/// Generation stops at this sequence.
pub const STOP_SEQUENCE: &str = "\nObservation";

/// Fixed retrieve-and-generate settings for the configured corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalSettings {
    pub knowledge_base_id: String,
    pub model_arn: String,
    pub number_of_results: i32,
    pub temperature: f32,
    pub max_tokens: i32,
    pub stop_sequences: Vec<String>,
}

impl RetrievalSettings {
    pub fn new(knowledge_base_id: impl Into<String>, model_arn: impl Into<String>) -> Self {
        Self {
            knowledge_base_id: knowledge_base_id.into(),
            model_arn: model_arn.into(),
            number_of_results: NUMBER_OF_RESULTS,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stop_sequences: vec![STOP_SEQUENCE.to_string()],
        }
    }
}

/// Incoming `POST /api/query` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Generated answer plus the citations the service attached to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RagAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
}

// ═══════════════════════════════════════════════════════════
// Citations, in the provider's JSON shape (camelCase)
// ═══════════════════════════════════════════════════════════

/// One citation: a span of the generated answer and the passages backing it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_response_part: Option<GeneratedResponsePart>,
    #[serde(default)]
    pub retrieved_references: Vec<RetrievedReference>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResponsePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_response_part: Option<TextResponsePart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TextResponsePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievedReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ReferenceContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ReferenceLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Retrieved passage. Text sources fill `text`, images fill `byteContent`,
/// structured sources fill `row`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceContent {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row: Vec<ContentColumn>,
}

/// One cell of a structured (row) passage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentColumn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_value: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
}

/// Where a passage came from. `type` names the data source kind; the
/// matching location object carries its address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceLocation {
    #[serde(rename = "type")]
    pub location_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_location: Option<UriLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_location: Option<UrlLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confluence_location: Option<UrlLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesforce_location: Option<UrlLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_point_location: Option<UrlLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kendra_document_location: Option<UriLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_document_location: Option<CustomDocumentLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_location: Option<SqlLocation>,
}

/// S3 and Kendra locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UriLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Web, Confluence, Salesforce and SharePoint locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UrlLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomDocumentLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SqlLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_use_fixed_generation_parameters() {
        let settings = RetrievalSettings::new("KB1", "arn:model");
        assert_eq!(settings.number_of_results, 5);
        assert_eq!(settings.max_tokens, 1024);
        assert!((settings.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(settings.stop_sequences, vec!["\nObservation".to_string()]);
    }

    #[test]
    fn query_request_tolerates_missing_question() {
        let req: QueryRequest = serde_json::from_str("{}").unwrap();
        assert!(req.question.is_none());
    }

    #[test]
    fn citation_serializes_in_provider_shape() {
        let citation = Citation {
            generated_response_part: Some(GeneratedResponsePart {
                text_response_part: Some(TextResponsePart {
                    text: Some("Exports fell.".into()),
                    span: Some(Span {
                        start: Some(0),
                        end: Some(12),
                    }),
                }),
            }),
            retrieved_references: vec![RetrievedReference {
                content: Some(ReferenceContent {
                    content_type: Some("TEXT".into()),
                    text: Some("Q3 exports fell by 4%.".into()),
                    ..ReferenceContent::default()
                }),
                location: Some(ReferenceLocation {
                    location_type: "S3".into(),
                    s3_location: Some(UriLocation {
                        uri: Some("s3://kb/q3.pdf".into()),
                    }),
                    ..ReferenceLocation::default()
                }),
                metadata: None,
            }],
        };

        let json = serde_json::to_value(&citation).unwrap();
        assert_eq!(
            json["generatedResponsePart"]["textResponsePart"]["span"]["end"],
            12
        );
        assert_eq!(json["retrievedReferences"][0]["location"]["type"], "S3");
        assert_eq!(
            json["retrievedReferences"][0]["location"]["s3Location"]["uri"],
            "s3://kb/q3.pdf"
        );
        assert_eq!(json["retrievedReferences"][0]["content"]["type"], "TEXT");
        assert!(json["retrievedReferences"][0].get("metadata").is_none());
        assert!(json["retrievedReferences"][0]["content"].get("row").is_none());
        assert!(json["retrievedReferences"][0]["location"]
            .get("webLocation")
            .is_none());
    }
}
