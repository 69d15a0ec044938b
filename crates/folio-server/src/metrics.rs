use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

pub static LIST_QUERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "folio_list_queries_total",
        "List queries by outcome",
        &["kind", "outcome"]
    )
    .expect("register folio_list_queries_total")
});

pub static QUERY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "folio_query_seconds",
        "List query latency",
        &["kind"],
        vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("register folio_query_seconds")
});

pub static DOCUMENTS_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "folio_documents_created_total",
        "Documents created",
        &["kind"]
    )
    .expect("register folio_documents_created_total")
});

pub static CREATE_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "folio_create_rejected_total",
        "Create requests rejected by reason",
        &["kind", "reason"]
    )
    .expect("register folio_create_rejected_total")
});

/// Forces registration so every series shows up on the first scrape.
pub fn init() {
    Lazy::force(&LIST_QUERIES_TOTAL);
    Lazy::force(&QUERY_SECONDS);
    Lazy::force(&DOCUMENTS_CREATED_TOTAL);
    Lazy::force(&CREATE_REJECTED_TOTAL);
}
