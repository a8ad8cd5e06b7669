use embedding_provider::config::default_hash_config;
use embedding_provider::embedder::HashEmbedder;
use doc_segmenter::JsonLayoutExtractor;
use intent_service::{FsBlobFetcher, IntentService, ServiceConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "Usage: cargo run -p intent-service --example process_and_search -- <DIR> <DOCUMENT> <QUESTION>"
        );
        std::process::exit(1);
    }
    let dir = &args[1];
    let document = &args[2];
    let question = &args[3];

    let cfg = ServiceConfig::from_env();
    let svc = IntentService::new(
        cfg,
        Box::new(FsBlobFetcher::new(dir)),
        Box::new(JsonLayoutExtractor::new()),
        Box::new(HashEmbedder::new(default_hash_config())?),
    )?;

    let chunks = svc.process_document(document, "pensiones", "web")?;
    println!("Stored {chunks} chunks from {document}");

    let answers = svc.search(question, "pensiones", "web")?;
    println!("Results: {}", answers.len());
    for (i, a) in answers.iter().enumerate() {
        let preview: String = a.text.chars().take(80).collect();
        println!("{:>2}. [{}] {:.4} {}", i + 1, a.document_name, a.similarity, preview);
    }
    Ok(())
}
