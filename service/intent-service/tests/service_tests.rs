use doc_segmenter::JsonLayoutExtractor;
use embedding_provider::config::default_hash_config;
use embedding_provider::embedder::HashEmbedder;
use intent_service::{FsBlobFetcher, IntentService, ServiceConfig};
use tempfile::TempDir;

fn span(text: &str, font: &str, flags: u32) -> serde_json::Value {
    serde_json::json!({"text": text, "font": font, "flags": flags})
}

fn line_block(spans: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({"lines": [{"spans": spans}]})
}

fn title_block(text: &str) -> serde_json::Value {
    line_block(vec![span(text, "Calibri-Bold", 16)])
}

fn body_block(text: &str) -> serde_json::Value {
    line_block(vec![span(text, "Calibri", 4)])
}

fn write_document(dir: &TempDir, name: &str, blocks: Vec<serde_json::Value>) {
    let payload = serde_json::json!({"pages": [{"blocks": blocks}]});
    std::fs::write(dir.path().join(name), payload.to_string()).expect("write document");
}

fn service_with(dir: &TempDir, mut cfg: ServiceConfig) -> IntentService {
    cfg.db_path = dir.path().join("intents.db");
    IntentService::new(
        cfg,
        Box::new(FsBlobFetcher::new(dir.path())),
        Box::new(JsonLayoutExtractor::new()),
        Box::new(HashEmbedder::new(default_hash_config()).expect("valid config")),
    )
    .expect("service")
}

#[test]
fn processes_a_labeled_document_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_document(
        &dir,
        "guia.json",
        vec![
            title_block("BeneficiosDeLaModalidadCuarenta_pago"),
            body_block("El beneficio se paga mensualmente."),
            body_block("El monto se ajusta cada enero."),
        ],
    );

    let cfg = ServiceConfig {
        repeat_intents: vec!["BeneficiosDeLaModalidadCuarenta".to_string()],
        ..ServiceConfig::default()
    };
    let svc = service_with(&dir, cfg);

    let count = svc
        .process_document("guia.json", "pensiones", "web")
        .expect("process");
    assert_eq!(count, 1);

    let hit = svc
        .lookup(
            "BeneficiosDeLaModalidadCuarenta",
            Some("pago"),
            Some("pensiones"),
            Some("web"),
        )
        .expect("lookup")
        .expect("present");
    assert_eq!(hit.intent, "BeneficiosDeLaModalidadCuarenta");
    assert_eq!(hit.sub_intent.as_deref(), Some("pago"));
    assert!(hit.is_repeat);
    assert_eq!(
        hit.text,
        "El beneficio se paga mensualmente. El monto se ajusta cada enero."
    );
    assert_eq!(
        hit.id,
        "pensiones_beneficiosdelamodalidadcuarenta_pago_guia.json_chunk_0"
    );
}

#[test]
fn search_returns_only_candidates_above_the_threshold() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_document(
        &dir,
        "guia.json",
        vec![
            title_block("Afiliacion_requisitos"),
            body_block("Debe presentar su documento de identidad."),
            title_block("Pagos_montos"),
            body_block("El monto se ajusta cada enero."),
        ],
    );

    let svc = service_with(&dir, ServiceConfig::default());
    svc.process_document("guia.json", "pensiones", "web")
        .expect("process");

    // The deterministic embedder maps identical text to identical vectors,
    // so asking with a stored chunk's exact text scores 1.0 against it and
    // near zero against the unrelated chunk.
    let answers = svc
        .search("Debe presentar su documento de identidad.", "pensiones", "web")
        .expect("search");
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].text, "Debe presentar su documento de identidad.");
    assert_eq!(answers[0].document_name, "guia.json");
    assert!(answers[0].similarity > 0.99);
}

#[test]
fn search_on_an_empty_scope_is_an_empty_payload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let svc = service_with(&dir, ServiceConfig::default());

    let answers = svc
        .search("Cualquier pregunta.", "pensiones", "web")
        .expect("search");
    assert!(answers.is_empty());
}

#[test]
fn reprocessing_replaces_instead_of_duplicating() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_document(
        &dir,
        "guia.json",
        vec![
            title_block("Afiliacion"),
            body_block("Version original."),
        ],
    );

    let svc = service_with(&dir, ServiceConfig::default());
    svc.process_document("guia.json", "pensiones", "web")
        .expect("first run");

    write_document(
        &dir,
        "guia.json",
        vec![
            title_block("Afiliacion"),
            body_block("Version corregida."),
        ],
    );
    let count = svc
        .process_document("guia.json", "pensiones", "web")
        .expect("second run");
    assert_eq!(count, 1);

    let hit = svc
        .lookup("Afiliacion", None, Some("pensiones"), Some("web"))
        .expect("lookup")
        .expect("present");
    assert_eq!(hit.text, "Version corregida.");
}

#[test]
fn small_insert_batches_still_persist_every_chunk() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_document(
        &dir,
        "guia.json",
        vec![
            title_block("Afiliacion"),
            body_block("Uno."),
            title_block("Pagos"),
            body_block("Dos."),
            title_block("Tramites"),
            body_block("Tres."),
        ],
    );

    let cfg = ServiceConfig {
        insert_batch_size: 1,
        ..ServiceConfig::default()
    };
    let svc = service_with(&dir, cfg);

    let count = svc
        .process_document("guia.json", "pensiones", "web")
        .expect("process");
    assert_eq!(count, 3);

    for intent in ["Afiliacion", "Pagos", "Tramites"] {
        assert!(svc
            .lookup(intent, None, Some("pensiones"), Some("web"))
            .expect("lookup")
            .is_some());
    }
}

#[test]
fn missing_documents_surface_a_fetch_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let svc = service_with(&dir, ServiceConfig::default());

    let err = svc
        .process_document("falta.json", "pensiones", "web")
        .expect_err("must fail");
    assert!(err.to_string().contains("falta.json"));
}

#[test]
fn lookup_misses_are_none_not_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let svc = service_with(&dir, ServiceConfig::default());

    let miss = svc
        .lookup("Afiliacion", None, Some("pensiones"), Some("web"))
        .expect("lookup");
    assert!(miss.is_none());
}
