#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;
pub mod nodes;

use std::sync::Arc;

use careflow::assistant::DialogueAssistant;
use careflow::collaborators::classifier::Classifier;
use careflow::collaborators::repository::Repository;
use careflow::graph::appointment_assistant_graph;
use careflow::observe::MemoryObserver;
use careflow::runtime::{InMemoryCheckpointStore, RuntimeConfig};

use self::mocks::{MockClassifier, MockRepository};

/// Everything a scenario test needs: the assistant plus handles to the mocks,
/// the store, and the observer it was wired with.
pub struct TestHarness {
    pub assistant: DialogueAssistant,
    pub classifier: Arc<MockClassifier>,
    pub repository: Arc<MockRepository>,
    pub store: Arc<InMemoryCheckpointStore>,
    pub observer: Arc<MemoryObserver>,
}

pub fn harness(classifier: MockClassifier, repository: MockRepository) -> TestHarness {
    let classifier = Arc::new(classifier);
    let repository = Arc::new(repository);
    let config = RuntimeConfig::in_memory();
    let graph = appointment_assistant_graph(
        classifier.clone() as Arc<dyn Classifier>,
        repository.clone() as Arc<dyn Repository>,
        &config,
    )
    .expect("canonical graph compiles");
    let store = Arc::new(InMemoryCheckpointStore::new());
    let observer = Arc::new(MemoryObserver::new());
    let assistant = DialogueAssistant::new(graph, store.clone(), observer.clone(), &config);
    TestHarness {
        assistant,
        classifier,
        repository,
        store,
        observer,
    }
}
