//! End-to-end lifecycle of a job through the registry: submit, run, deliver,
//! snapshot, terminate, delete.

use std::collections::HashSet;

use ingestjob_core::{
    DeliveryStatus, FeatureSet, FeatureSetRef, FeatureSetSpec, FieldSpec, IngestionJobStatus,
    JobRecord, JobStatus, RunnerKind, Source, SourceRef, Store, StoreConfig, StoreRef, ValueType,
};
use ingestjob_registry::{JobStore, JobStoreError};

fn feature_set(name: &str) -> FeatureSet {
    FeatureSet::new(
        "retail",
        name,
        &FeatureSetSpec {
            max_age_secs: 7200,
            entities: vec![FieldSpec {
                name: "customer_id".to_string(),
                value_type: ValueType::String,
            }],
            features: vec![FieldSpec {
                name: format!("{name}_value"),
                value_type: ValueType::Double,
            }],
            source_id: Some("kafka-orders".to_string()),
        },
    )
}

#[test]
fn job_lifecycle_through_registry() {
    let tmp = tempfile::tempdir().unwrap();
    let store = JobStore::new(tmp.path()).unwrap();

    store
        .save_source(&Source::kafka("kafka-orders", "kafka:9092", "orders"))
        .unwrap();
    store
        .save_store(
            &Store::new(
                "warehouse",
                &StoreConfig::BigQuery {
                    project_id: "acme".to_string(),
                    dataset_id: "features".to_string(),
                },
            )
            .with_subscription("retail", "*"),
        )
        .unwrap();
    let names = ["orders", "refunds", "baskets"];
    for name in names {
        store.save_feature_set(&feature_set(name)).unwrap();
    }

    // submit
    let source = SourceRef::new("kafka-orders");
    let sink = StoreRef::new("warehouse");
    let id = JobRecord::generate_id(&source, &sink);
    let mut job = JobRecord::new(id.clone(), RunnerKind::Dataflow, source.clone(), sink.clone()).unwrap();
    for name in names {
        let fs = store.load_feature_set(&FeatureSetRef::new("retail", name)).unwrap().unwrap();
        assert!(job.associate(&fs));
    }
    store.save_job(&job).unwrap();
    assert_eq!(store.find_active_job(&source, &sink).unwrap().unwrap().id(), id);

    // runner picks it up
    store.set_external_id(&id, "df-0001").unwrap();
    let running = store.update_status(&id, JobStatus::Running).unwrap();
    assert!(running.is_running());
    assert!(!running.has_terminated());

    let mut running = store.load_job(&id).unwrap().unwrap();
    assert!(running.feature_set_statuses().all(|a| a.version() == 1));
    running.set_delivery_status(&FeatureSetRef::new("retail", "orders"), DeliveryStatus::Delivered);
    store.save_job(&running).unwrap();

    let snapshot = store.snapshot_job(&id).unwrap();
    assert_eq!(snapshot.external_id, "df-0001");
    assert_eq!(snapshot.status, IngestionJobStatus::Running);
    assert_eq!(snapshot.store.name, "warehouse");
    assert_eq!(snapshot.store.subscriptions.len(), 1);
    let got: HashSet<&str> = snapshot.feature_set_names().into_iter().collect();
    assert_eq!(got, names.into_iter().collect::<HashSet<_>>());

    // runner finishes
    let done = store.update_status(&id, JobStatus::Completed).unwrap();
    assert!(done.has_terminated());
    assert!(store.find_active_job(&source, &sink).unwrap().is_none());
    assert!(matches!(
        store.update_status(&id, JobStatus::Running),
        Err(JobStoreError::Job(_))
    ));

    let exported = store.export_snapshot(&id).unwrap();
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(exported).unwrap()).unwrap();
    assert_eq!(json["status"], "COMPLETED");
    assert_eq!(json["id"], id.as_str());

    // removal cascades to associations only
    assert!(store.delete_job(&id).unwrap());
    assert!(store.list_jobs().unwrap().is_empty());
    assert!(store.load_feature_set(&FeatureSetRef::new("retail", "orders")).unwrap().is_some());
    assert!(store.load_store(&sink).unwrap().is_some());
}
