use std::collections::HashSet;

use super::*;
use crate::feature_set::{FeatureSet, FeatureSetSpec, FieldSpec, ValueType};
use crate::lookup::EntityCatalog;
use crate::source::Source;
use crate::status::IngestionJobStatus;
use crate::store::Store;

fn spec() -> FeatureSetSpec {
    FeatureSetSpec {
        max_age_secs: 600,
        entities: vec![FieldSpec {
            name: "customer_id".into(),
            value_type: ValueType::Int64,
        }],
        features: vec![FieldSpec {
            name: "total_spend".into(),
            value_type: ValueType::Double,
        }],
        source_id: Some("kafka-1".into()),
    }
}

fn catalog(feature_sets: &[&str]) -> EntityCatalog {
    let mut catalog = EntityCatalog::new();
    catalog
        .insert_source(Source::kafka("kafka-1", "broker:9092", "features"))
        .insert_store(Store::redis("store-a", "localhost", 6379));
    for name in feature_sets {
        catalog.insert_feature_set(FeatureSet::new("default", *name, &spec()));
    }
    catalog
}

fn job(status: JobStatus) -> JobRecord {
    JobRecord::new(
        "job-1",
        RunnerKind::Direct,
        SourceRef::new("kafka-1"),
        StoreRef::new("store-a"),
    )
    .unwrap()
    .with_status(status)
}

#[test]
fn empty_id_is_rejected() {
    let err = JobRecord::new("", RunnerKind::Direct, SourceRef::new("s"), StoreRef::new("t")).unwrap_err();
    assert!(matches!(err, JobError::EmptyId));
}

#[test]
fn generated_ids_name_source_and_sink() {
    let a = JobRecord::generate_id(&SourceRef::new("kafka-1"), &StoreRef::new("store-a"));
    let b = JobRecord::generate_id(&SourceRef::new("kafka-1"), &StoreRef::new("store-a"));
    assert!(a.starts_with("kafka-1-to-store-a-"));
    assert_ne!(a, b);
}

#[test]
fn new_job_is_pending() {
    let job = JobRecord::new("job-1", RunnerKind::Dataflow, SourceRef::new("s"), StoreRef::new("t")).unwrap();
    assert_eq!(job.status(), JobStatus::Pending);
    assert!(job.external_id().is_empty());
    assert_eq!(job.created_at(), job.updated_at());
}

#[test]
fn has_terminated_follows_status_classification() {
    for status in JobStatus::ALL {
        assert_eq!(job(status).has_terminated(), status.is_terminal(), "{status}");
    }
}

#[test]
fn is_running_only_when_running() {
    for status in JobStatus::ALL {
        assert_eq!(job(status).is_running(), status == JobStatus::Running, "{status}");
    }
    assert!(!job(JobStatus::Pending).is_running());
}

#[test]
fn terminal_states_are_not_running() {
    for status in [JobStatus::Completed, JobStatus::Failed, JobStatus::Aborted] {
        let job = job(status);
        assert!(job.has_terminated());
        assert!(!job.is_running());
    }
}

#[test]
fn sink_name_is_store_name() {
    let job = job(JobStatus::Running);
    let store = Store::redis("store-a", "localhost", 6379);
    assert_eq!(job.sink_name(), store.name());
}

#[test]
fn transitions_through_lifecycle() {
    let mut job = job(JobStatus::Pending);
    job.transition_to(JobStatus::Running).unwrap();
    assert!(job.is_running());
    job.transition_to(JobStatus::Completed).unwrap();
    assert!(job.has_terminated());
}

#[test]
fn terminal_status_never_moves() {
    let mut job = job(JobStatus::Aborted);
    let err = job.transition_to(JobStatus::Running).unwrap_err();
    assert!(matches!(
        err,
        JobError::TerminalTransition {
            from: JobStatus::Aborted,
            to: JobStatus::Running,
            ..
        }
    ));
    assert_eq!(job.status(), JobStatus::Aborted);
    // same status again is not a transition
    job.transition_to(JobStatus::Aborted).unwrap();
}

#[test]
fn mutation_refreshes_updated_at() {
    let mut job = job(JobStatus::Pending);
    let before = job.updated_at();
    job.set_external_id("dataflow-2024-1");
    assert_eq!(job.external_id(), "dataflow-2024-1");
    assert!(job.updated_at() >= before);
    assert_eq!(job.created_at(), before);
}

#[test]
fn feature_set_association_is_unique() {
    let mut job = job(JobStatus::Pending);
    assert!(job.add_feature_set(FeatureSetRef::new("default", "fs-1"), 1));
    assert!(!job.add_feature_set(FeatureSetRef::new("default", "fs-1"), 1));
    assert_eq!(job.feature_set_count(), 1);
}

#[test]
fn associations_point_back_at_job() {
    let job = job(JobStatus::Pending)
        .with_feature_set(FeatureSetRef::new("default", "fs-1"), 1)
        .with_feature_set(FeatureSetRef::new("default", "fs-2"), 1);
    assert!(job.feature_set_statuses().all(|a| a.job_id() == "job-1"));
    assert!(job
        .feature_set_statuses()
        .all(|a| a.delivery_status() == DeliveryStatus::InProgress));
}

#[test]
fn association_stamps_feature_set_version() {
    let mut fs = FeatureSet::new("default", "fs-1", &spec());
    fs.version = 4;
    let mut job = job(JobStatus::Pending);
    assert!(job.associate(&fs));
    assert!(!job.associate(&fs));

    let assoc = job.feature_set_statuses().next().unwrap();
    assert_eq!(assoc.feature_set(), &fs.reference());
    assert_eq!(assoc.version(), 4);

    let json = serde_json::to_value(assoc).unwrap();
    assert_eq!(json["version"], 4);
    assert_eq!(json["deliveryStatus"], "IN_PROGRESS");
    let back: FeatureSetJobStatus = serde_json::from_value(json).unwrap();
    assert_eq!(&back, assoc);
}

#[test]
fn delivery_status_updates_only_known_feature_sets() {
    let fs = FeatureSetRef::new("default", "fs-1");
    let mut job = job(JobStatus::Running).with_feature_set(fs.clone(), 1);
    assert!(job.set_delivery_status(&fs, DeliveryStatus::Delivered));
    assert!(!job.set_delivery_status(&FeatureSetRef::new("default", "other"), DeliveryStatus::Delivered));
    let assoc = job.feature_set_statuses().next().unwrap();
    assert_eq!(assoc.delivery_status(), DeliveryStatus::Delivered);
}

#[test]
fn remove_feature_set_drops_association() {
    let fs = FeatureSetRef::new("default", "fs-1");
    let mut job = job(JobStatus::Running).with_feature_set(fs.clone(), 1);
    let removed = job.remove_feature_set(&fs).unwrap();
    assert_eq!(removed.feature_set(), &fs);
    assert_eq!(job.feature_set_count(), 0);
    assert!(job.remove_feature_set(&fs).is_none());
}

#[test]
fn attach_refuses_foreign_association() {
    let other = JobRecord::new("job-2", RunnerKind::Direct, SourceRef::new("s"), StoreRef::new("t"))
        .unwrap()
        .with_feature_set(FeatureSetRef::new("default", "fs-1"), 1);
    let foreign = other.feature_set_statuses().next().unwrap().clone();

    let mut job = job(JobStatus::Running);
    let err = job.attach(foreign).unwrap_err();
    assert!(matches!(err, JobError::ForeignAssociation { .. }));
    assert_eq!(job.feature_set_count(), 0);
}

#[test]
fn snapshot_of_running_job() {
    let job = job(JobStatus::Running).with_feature_set(FeatureSetRef::new("default", "fs-1"), 1);
    let snapshot = job.to_external_snapshot(&catalog(&["fs-1"])).unwrap();

    assert_eq!(snapshot.id, "job-1");
    assert_eq!(snapshot.status, IngestionJobStatus::Running);
    assert_eq!(snapshot.status.code(), 2);
    assert_eq!(snapshot.store.name, "store-a");
    assert_eq!(snapshot.source.id, "kafka-1");
    assert_eq!(snapshot.feature_set_names(), vec!["fs-1"]);
}

#[test]
fn snapshot_covers_every_association_once() {
    let names = ["fs-1", "fs-2", "fs-3", "fs-4"];
    let mut job = job(JobStatus::Running);
    for name in names {
        job.add_feature_set(FeatureSetRef::new("default", name), 1);
    }
    let snapshot = job.to_external_snapshot(&catalog(&names)).unwrap();

    assert_eq!(snapshot.feature_sets.len(), job.feature_set_count());
    let got: HashSet<&str> = snapshot.feature_set_names().into_iter().collect();
    let want: HashSet<&str> = names.into_iter().collect();
    assert_eq!(got, want);
}

#[test]
fn one_bad_feature_set_aborts_snapshot() {
    let mut catalog = catalog(&["fs-1"]);
    let mut broken = FeatureSet::new("default", "fs-2", &spec());
    broken.spec_json = "{".to_string();
    catalog.insert_feature_set(broken);

    let job = job(JobStatus::Running)
        .with_feature_set(FeatureSetRef::new("default", "fs-1"), 1)
        .with_feature_set(FeatureSetRef::new("default", "fs-2"), 1);

    match job.to_external_snapshot(&catalog) {
        Err(JobError::Decode(e)) => assert_eq!(e.key(), "default/fs-2"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn undecodable_sink_aborts_snapshot() {
    let mut catalog = catalog(&[]);
    let mut store = Store::redis("store-a", "localhost", 6379);
    store.config_json = "[]".to_string();
    catalog.insert_store(store);

    let err = job(JobStatus::Running).to_external_snapshot(&catalog).unwrap_err();
    assert!(matches!(err, JobError::Decode(_)));
}

#[test]
fn unresolved_reference_aborts_snapshot() {
    let job = job(JobStatus::Running).with_feature_set(FeatureSetRef::new("default", "missing"), 1);
    let err = job.to_external_snapshot(&catalog(&[])).unwrap_err();
    assert!(matches!(err, JobError::Unresolved { kind: "feature set", .. }));

    let err = job.to_external_snapshot(&EntityCatalog::new()).unwrap_err();
    assert!(matches!(err, JobError::Unresolved { kind: "source", .. }));
}

#[test]
fn snapshot_serializes_camel_case() {
    let mut job = job(JobStatus::Running);
    job.set_external_id("ext-9");
    let snapshot = job.to_external_snapshot(&catalog(&[])).unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["externalId"], "ext-9");
    assert_eq!(json["status"], "RUNNING");
    assert!(json["featureSets"].as_array().unwrap().is_empty());
}

#[test]
fn record_serialization_omits_associations() {
    let job = job(JobStatus::Running).with_feature_set(FeatureSetRef::new("default", "fs-1"), 1);
    let json = serde_json::to_string(&job).unwrap();
    assert!(!json.contains("featureSetStatuses"));

    let back: JobRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id(), "job-1");
    assert_eq!(back.runner(), RunnerKind::Direct);
    assert_eq!(back.feature_set_count(), 0);
}

#[test]
fn stored_record_with_empty_id_is_rejected() {
    let job = job(JobStatus::Running);
    let mut json = serde_json::to_value(&job).unwrap();
    json["id"] = serde_json::Value::String(String::new());
    assert!(serde_json::from_value::<JobRecord>(json).is_err());
}
