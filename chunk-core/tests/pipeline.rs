use std::sync::mpsc;

use chunk_core::{
    corpus::chunked_sents,
    iob::{iob_to_tree, tree_to_iob},
    tagger::tagged,
    ChunkParser, ChunkPipeline, ChunkerConfig, ChunkerKind, PipelineEvent, TagChunker, TaggerClass,
    TransformPipeline,
};

#[test]
fn corpus_survives_iob_round_trip() {
    for tree in chunked_sents() {
        let triples = tree_to_iob(&tree).unwrap();
        assert_eq!(triples.len(), tree.leaves().len());
        assert_eq!(iob_to_tree(&triples), tree);
    }
}

#[test]
fn tag_chunker_scores_well_on_its_training_data() {
    let sents = chunked_sents();
    let chunker = TagChunker::train(&sents, &[TaggerClass::Unigram, TaggerClass::Bigram]).unwrap();
    let score = chunker.evaluate(&sents);
    assert!(score.accuracy() > 0.8, "accuracy = {}", score.accuracy());
    assert!(score.f_measure() > 0.0);
}

#[test]
fn analysis_covers_every_token() {
    let pipeline = ChunkPipeline::new().unwrap();
    let analysis = pipeline
        .analyze("The company bought a new factory. Prices rose sharply!")
        .unwrap();

    assert_eq!(analysis.trees.len(), 2);
    assert_eq!(analysis.sentences.len(), 2);
    let leaves: usize = analysis.trees.iter().map(|t| t.leaves().len()).sum();
    assert_eq!(leaves, analysis.tagged.len());
    assert_eq!(analysis.triples.len(), analysis.tagged.len());
    for chunk in &analysis.chunks {
        assert!(chunk.sentence < analysis.trees.len());
    }
}

#[test]
fn streaming_ends_with_done() {
    let pipeline = ChunkPipeline::new().unwrap();
    let (tx, rx) = mpsc::channel();
    pipeline.analyze_streaming("The stocks of gold are rising.", tx);
    let events: Vec<PipelineEvent> = rx.into_iter().collect();

    assert!(matches!(events.first(), Some(PipelineEvent::TokenizationDone { .. })));
    assert!(matches!(events.last(), Some(PipelineEvent::Done { .. })));
}

#[test]
fn classifier_pipeline_from_json() {
    let config = ChunkerConfig::from_json_str(r#"{"chunker": "classifier", "perceptron_iterations": 3}"#).unwrap();
    assert_eq!(config.chunker, ChunkerKind::Classifier);
    let pipeline = ChunkPipeline::from_config(config).unwrap();
    let analysis = pipeline.analyze("The market was quiet.").unwrap();
    assert_eq!(analysis.trees.len(), 1);
}

#[test]
fn transform_pipeline_rewrites_recipe_book() {
    let chunk = tagged(&[
        ("the", "DT"),
        ("book", "NN"),
        ("of", "IN"),
        ("recipes", "NNS"),
        ("is", "VBZ"),
        ("delicious", "JJ"),
    ]);
    let out = TransformPipeline::default().run(&chunk);
    assert_eq!(
        out,
        tagged(&[("delicious", "JJ"), ("recipe", "NN"), ("book", "NN")])
    );
}
