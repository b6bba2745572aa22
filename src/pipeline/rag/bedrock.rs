//! Bedrock Agent Runtime adapter for `KnowledgeBase`, plus a mock for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::types::{
    Citation as SdkCitation, GenerationConfiguration, InferenceConfig,
    KnowledgeBaseRetrievalConfiguration, KnowledgeBaseRetrieveAndGenerateConfiguration,
    KnowledgeBaseVectorSearchConfiguration, RetrievalResultContent, RetrievalResultLocation,
    RetrieveAndGenerateConfiguration, RetrieveAndGenerateInput, RetrieveAndGenerateType,
    RetrievedReference as SdkReference, TextInferenceConfig,
};
use aws_sdk_bedrockagentruntime::Client;
use aws_smithy_types::{Document, Number};

use super::types::*;
use super::{KnowledgeBase, RagError};
use crate::aws::error_parts;

/// Knowledge base backed by Bedrock `RetrieveAndGenerate`.
pub struct BedrockKnowledgeBase {
    client: Client,
    settings: RetrievalSettings,
}

impl BedrockKnowledgeBase {
    pub fn new(client: Client, settings: RetrievalSettings) -> Self {
        Self { client, settings }
    }

    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, settings: RetrievalSettings) -> Self {
        Self::new(Client::new(sdk_config), settings)
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    fn configuration(&self) -> Result<RetrieveAndGenerateConfiguration, RagError> {
        let build = |e: aws_sdk_bedrockagentruntime::error::BuildError| RagError::Request(e.to_string());

        let retrieval = KnowledgeBaseRetrievalConfiguration::builder()
            .vector_search_configuration(
                KnowledgeBaseVectorSearchConfiguration::builder()
                    .number_of_results(self.settings.number_of_results)
                    .build(),
            )
            .build();

        let mut text_config = TextInferenceConfig::builder()
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens);
        for stop in &self.settings.stop_sequences {
            text_config = text_config.stop_sequences(stop.clone());
        }

        let generation = GenerationConfiguration::builder()
            .inference_config(
                InferenceConfig::builder()
                    .text_inference_config(text_config.build())
                    .build(),
            )
            .build();

        let knowledge_base = KnowledgeBaseRetrieveAndGenerateConfiguration::builder()
            .knowledge_base_id(&self.settings.knowledge_base_id)
            .model_arn(&self.settings.model_arn)
            .retrieval_configuration(retrieval)
            .generation_configuration(generation)
            .build()
            .map_err(build)?;

        RetrieveAndGenerateConfiguration::builder()
            .r#type(RetrieveAndGenerateType::KnowledgeBase)
            .knowledge_base_configuration(knowledge_base)
            .build()
            .map_err(build)
    }
}

#[async_trait]
impl KnowledgeBase for BedrockKnowledgeBase {
    async fn retrieve_and_generate(&self, question: &str) -> Result<RagAnswer, RagError> {
        let input = RetrieveAndGenerateInput::builder()
            .text(question)
            .build()
            .map_err(|e| RagError::Request(e.to_string()))?;

        let response = self
            .client
            .retrieve_and_generate()
            .input(input)
            .retrieve_and_generate_configuration(self.configuration()?)
            .send()
            .await
            .map_err(|err| {
                let (code, message) = error_parts(&err);
                tracing::warn!(
                    code = %code,
                    knowledge_base_id = %self.settings.knowledge_base_id,
                    "RetrieveAndGenerate failed"
                );
                RagError::Provider { code, message }
            })?;

        let output = response.output().ok_or(RagError::EmptyResponse)?;
        Ok(RagAnswer {
            answer: output.text().to_string(),
            citations: response.citations().iter().map(convert_citation).collect(),
        })
    }
}

// ═══════════════════════════════════════════════════════════
// SDK → JSON citation conversion
// ═══════════════════════════════════════════════════════════

fn convert_citation(citation: &SdkCitation) -> Citation {
    let generated_response_part = citation.generated_response_part().map(|part| {
        GeneratedResponsePart {
            text_response_part: part.text_response_part().map(|text_part| TextResponsePart {
                text: owned(text_part.text()),
                span: text_part.span().map(|span| Span {
                    start: span.start(),
                    end: span.end(),
                }),
            }),
        }
    });

    Citation {
        generated_response_part,
        retrieved_references: citation
            .retrieved_references()
            .iter()
            .map(convert_reference)
            .collect(),
    }
}

fn convert_reference(reference: &SdkReference) -> RetrievedReference {
    RetrievedReference {
        content: reference.content().map(convert_content),
        location: reference.location().map(convert_location),
        metadata: reference.metadata().map(metadata_to_json),
    }
}

fn convert_content(content: &RetrievalResultContent) -> ReferenceContent {
    ReferenceContent {
        content_type: content.r#type().map(|t| t.as_str().to_string()),
        text: owned(Some(content.text())),
        byte_content: owned(content.byte_content()),
        row: content
            .row()
            .iter()
            .map(|column| ContentColumn {
                column_name: owned(column.column_name()),
                column_value: owned(column.column_value()),
                column_type: column.r#type().map(|t| t.as_str().to_string()),
            })
            .collect(),
    }
}

fn convert_location(location: &RetrievalResultLocation) -> ReferenceLocation {
    ReferenceLocation {
        location_type: location.r#type().as_str().to_string(),
        s3_location: location.s3_location().map(|l| UriLocation {
            uri: owned(l.uri()),
        }),
        web_location: location.web_location().map(|l| UrlLocation {
            url: owned(l.url()),
        }),
        confluence_location: location.confluence_location().map(|l| UrlLocation {
            url: owned(l.url()),
        }),
        salesforce_location: location.salesforce_location().map(|l| UrlLocation {
            url: owned(l.url()),
        }),
        share_point_location: location.share_point_location().map(|l| UrlLocation {
            url: owned(l.url()),
        }),
        kendra_document_location: location.kendra_document_location().map(|l| UriLocation {
            uri: owned(l.uri()),
        }),
        custom_document_location: location
            .custom_document_location()
            .map(|l| CustomDocumentLocation { id: owned(l.id()) }),
        sql_location: location.sql_location().map(|l| SqlLocation {
            query: owned(l.query()),
        }),
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn metadata_to_json(metadata: &HashMap<String, Document>) -> serde_json::Map<String, serde_json::Value> {
    metadata
        .iter()
        .map(|(k, v)| (k.clone(), document_to_json(v)))
        .collect()
}

/// Convert a Smithy document into the equivalent JSON value.
pub fn document_to_json(doc: &Document) -> serde_json::Value {
    use serde_json::Value;

    match doc {
        Document::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), document_to_json(v)))
                .collect(),
        ),
        Document::Array(items) => Value::Array(items.iter().map(document_to_json).collect()),
        Document::Number(Number::PosInt(n)) => Value::from(*n),
        Document::Number(Number::NegInt(n)) => Value::from(*n),
        Document::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Document::String(s) => Value::String(s.clone()),
        Document::Bool(b) => Value::Bool(*b),
        Document::Null => Value::Null,
    }
}

// ═══════════════════════════════════════════════════════════
// Mock
// ═══════════════════════════════════════════════════════════

/// Mock knowledge base that returns a configured answer and records questions.
pub struct MockKnowledgeBase {
    answer: RagAnswer,
    failure: Option<String>,
    questions: Mutex<Vec<String>>,
}

impl MockKnowledgeBase {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: RagAnswer {
                answer: answer.to_string(),
                citations: Vec::new(),
            },
            failure: None,
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a provider error carrying `code`.
    pub fn failing(code: &str) -> Self {
        Self {
            failure: Some(code.to_string()),
            ..Self::new("")
        }
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.answer.citations = citations;
        self
    }

    /// Questions received so far, in order.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl KnowledgeBase for MockKnowledgeBase {
    async fn retrieve_and_generate(&self, question: &str) -> Result<RagAnswer, RagError> {
        if let Ok(mut questions) = self.questions.lock() {
            questions.push(question.to_string());
        }
        match &self.failure {
            Some(code) => Err(RagError::Provider {
                code: code.clone(),
                message: format!("mock failure: {code}"),
            }),
            None => Ok(self.answer.clone()),
        }
    }
}
