//! In-memory doubles for the generation seams

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dealplan_ai::{ChatGateway, ChatMessage, ExtractError, GatewayError, TextExtractor};
use dealplan_core::models::{Artifact, DspDocument, Input, NewArtifact, Opportunity};
use dealplan_core::{AppError, StorageBackend};
use dealplan_db::GenerationStore;
use dealplan_storage::{Storage, StorageError, StorageResult};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub fn sample_document_json() -> String {
    serde_json::json!({
        "deal_strategy_plan": {
            "project_objective": {
                "purpose": "Definir el objetivo estratégico.",
                "strategic_objective": "Reducir el tiempo de onboarding",
                "success_criteria": "Onboarding en menos de 2 días",
                "notes": ""
            },
            "use_case": {
                "purpose": "Describir el problema.",
                "problem_to_solve": "Procesos manuales",
                "current_consequences": "Errores frecuentes",
                "business_impact": "Pérdida de clientes",
                "priority_level": "Alta",
                "priority_rationale": "Renovación en Q3",
                "notes": "Confirmar con el sponsor"
            },
            "bundles": {
                "purpose": "Identificar bundle.",
                "recommended_bundle": "AI Accelerator",
                "bundle_options_considered": [
                    { "bundle": "AI Accelerator", "fit_reason": "Caso de uso de IA" }
                ],
                "notes": ""
            },
            "preliminary_solution_approach": {
                "purpose": "Definir el abordaje.",
                "recommended_approach": "Discovery de 4 semanas",
                "approach_rationale": "Alcance poco claro",
                "assumptions": ["Acceso a datos históricos"],
                "open_questions": ["Presupuesto aprobado?"],
                "notes": ""
            },
            "functionalities_description": {
                "purpose": "Listar funcionalidades.",
                "expected_functionalities": [
                    { "name": "Portal", "description": "Alta de clientes", "business_value": "Autoservicio" }
                ],
                "out_of_scope": ["Facturación"],
                "notes": ""
            },
            "technical": {
                "purpose": "Evaluar infraestructura.",
                "cloud_environment": "AWS",
                "cloud_experience": "Media",
                "infrastructure_owner": "Cliente",
                "required_data": [
                    { "data_type": "CRM", "availability": "Parcial", "location": "Salesforce" }
                ],
                "data_gaps_or_risks": ["Datos incompletos"],
                "notes": ""
            },
            "competitiveness_and_strategic_positioning": {
                "purpose": "Mapear competencia.",
                "competitors_or_alternatives": [
                    { "name": "Globant", "status_or_role": "Incumbente", "strengths": "Escala", "weaknesses": "Costo" }
                ],
                "santex_advantages": ["Experiencia en el sector"],
                "differentiation_narrative": "Entrega rápida",
                "notes": ""
            },
            "commercial_roadmap_next_steps": {
                "purpose": "Establecer hitos.",
                "next_steps": [
                    { "step": "Workshop", "owner": "Jane Doe", "expected_date_or_window": "Semana 1", "exit_criteria": "Alcance acordado" }
                ],
                "dependencies": ["Aprobación legal"],
                "notes": ""
            },
            "meta": {
                "opportunity_id": "42",
                "generated_from_inputs": ["brief.pdf"],
                "confidence_level": "Media",
                "missing_information_summary": "Presupuesto"
            }
        }
    })
    .to_string()
}

pub fn sample_document() -> DspDocument {
    serde_json::from_str(&sample_document_json()).expect("sample document matches schema")
}

pub fn opportunity(opportunity_id: i32) -> Opportunity {
    Opportunity {
        opportunity_id,
        opportunity_name: "Acme Renewal".to_string(),
        description: Some("Renovación del contrato de soporte".to_string()),
        client_id: 1,
        responsible_id: 1,
        status: "OPEN".to_string(),
        generated_at: Utc::now(),
        generated_by: Some("jane@acme.com".to_string()),
    }
}

pub fn input(input_id: i32, name: &str, storage_path: &str) -> Input {
    Input {
        input_id,
        opportunity_id: 1,
        input_name: name.to_string(),
        storage_path: storage_path.to_string(),
        file_size_kb: 1,
        uploaded_at: Utc::now(),
        uploaded_by: None,
    }
}

/// Gateway that replays a fixed script of answers
pub struct ScriptedGateway {
    answers: Mutex<VecDeque<Result<String, GatewayError>>>,
    conversations: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedGateway {
    pub fn new(answers: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            conversations: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }

    pub fn conversation(&self, call: usize) -> Vec<ChatMessage> {
        self.conversations.lock().unwrap()[call].clone()
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        self.conversations.lock().unwrap().push(messages.to_vec());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::MalformedResponse("script exhausted".into())))
    }
}

/// Treats the stored bytes as the document text
pub struct Utf8Extractor;

#[async_trait]
impl TextExtractor for Utf8Extractor {
    async fn extract_text(&self, data: Bytes) -> Result<String, ExtractError> {
        String::from_utf8(data.to_vec()).map_err(|e| ExtractError::Extraction(e.to_string()))
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryStorage {
    fn path(bucket: &str, key: &str) -> String {
        format!("{}/{}", bucket, key)
    }

    pub fn put(&self, bucket: &str, key: &str, text: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(Self::path(bucket, key), Bytes::from(text.to_string()));
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(&Self::path(bucket, key))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ensure_bucket(&self, _bucket: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<()> {
        let mut objects = self.objects.lock().unwrap();
        let path = Self::path(bucket, key);
        if objects.contains_key(&path) {
            return Err(StorageError::AlreadyExists(path));
        }
        objects.insert(path, data);
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.get(bucket, key)
            .ok_or_else(|| StorageError::NotFound(Self::path(bucket, key)))
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.objects
            .lock()
            .unwrap()
            .remove(&Self::path(bucket, key))
            .map(drop)
            .ok_or_else(|| StorageError::NotFound(Self::path(bucket, key)))
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        Ok(self.get(bucket, key).is_some())
    }

    async fn signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "memory://{}/{}?ttl={}",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Generation store over fixed rows; inserted artifacts are kept for inspection
pub struct MemoryStore {
    pub opportunity: Option<Opportunity>,
    pub inputs: Vec<Input>,
    pub artifacts: Mutex<Vec<Artifact>>,
}

impl MemoryStore {
    pub fn new(opportunity: Option<Opportunity>, inputs: Vec<Input>) -> Self {
        Self {
            opportunity,
            inputs,
            artifacts: Mutex::new(Vec::new()),
        }
    }

    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn get_opportunity(&self, opportunity_id: i32) -> Result<Option<Opportunity>, AppError> {
        Ok(self
            .opportunity
            .clone()
            .filter(|o| o.opportunity_id == opportunity_id))
    }

    async fn list_inputs(&self, _opportunity_id: i32) -> Result<Vec<Input>, AppError> {
        Ok(self.inputs.clone())
    }

    async fn count_artifacts(
        &self,
        opportunity_id: i32,
        artifact_type: &str,
    ) -> Result<i64, AppError> {
        Ok(self
            .artifacts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.opportunity_id == opportunity_id && a.artifact_type == artifact_type)
            .count() as i64)
    }

    async fn insert_artifact(&self, artifact: NewArtifact) -> Result<Artifact, AppError> {
        let mut artifacts = self.artifacts.lock().unwrap();
        let row = Artifact {
            artifact_id: artifacts.len() as i32 + 1,
            opportunity_id: artifact.opportunity_id,
            artifact_name: artifact.artifact_name,
            artifact_type: artifact.artifact_type,
            artifact_url: artifact.artifact_url,
            generated_at: Utc::now(),
            generated_by: Some(artifact.generated_by),
            status: artifact.status,
            version: artifact.version,
            gdrive_file_name: None,
            gdrive_web_url: None,
        };
        artifacts.push(row.clone());
        Ok(row)
    }
}
