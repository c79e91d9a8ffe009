//! Integration tests for shelfscope-core
//!
//! These tests exercise the seed → forecast → simulate → insights workflow
//! against both repository implementations.

use std::sync::Arc;

use chrono::NaiveDate;
use shelfscope_core::{
    chat, generate_forecast, run_simulation, seed_sample_data, AIClient, DateRange,
    ForecastModel, ForecastRequest, InsightEngine, InsightType, MemoryRepository, Repository,
    SegmentUpdate, SimulationEngine, SimulationRequest, SqliteRepository,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn forecast_request(periods: u32) -> ForecastRequest {
    ForecastRequest {
        upc: "12345".to_string(),
        date_range: DateRange {
            start: date(2025, 1, 1),
            end: date(2025, 3, 31),
        },
        periods,
    }
}

fn repositories() -> Vec<Arc<dyn Repository>> {
    vec![
        Arc::new(MemoryRepository::new()),
        Arc::new(SqliteRepository::in_memory().expect("Failed to create test database")),
    ]
}

// =============================================================================
// Forecast Workflow
// =============================================================================

#[tokio::test]
async fn test_forecast_round_trip() {
    for repo in repositories() {
        seed_sample_data(repo.as_ref()).await.unwrap();

        let created = generate_forecast(
            repo.as_ref(),
            &ForecastModel::default(),
            &forecast_request(4),
            date(2025, 4, 1),
        )
        .await
        .unwrap();
        assert_eq!(created.len(), 4, "store: {}", repo.kind());

        let fetched = repo.list_forecasts(Some("12345")).await.unwrap();
        assert_eq!(fetched.len(), 4);
        for (a, b) in created.iter().zip(fetched.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.forecast_date, b.forecast_date);
            assert_eq!(a.predicted_sales_value, b.predicted_sales_value);
            assert_eq!(a.predicted_sales_units, b.predicted_sales_units);
            assert_eq!(a.confidence_lower, b.confidence_lower);
            assert_eq!(a.confidence_upper, b.confidence_upper);
        }

        assert_eq!(created[0].forecast_date, date(2025, 2, 1));
        assert_eq!(created[3].forecast_date, date(2025, 5, 1));
        assert!(repo.list_forecasts(Some("99999")).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_zero_period_forecast_stores_nothing() {
    let repo = MemoryRepository::new();
    seed_sample_data(&repo).await.unwrap();

    let created = generate_forecast(
        &repo,
        &ForecastModel::default(),
        &forecast_request(0),
        date(2025, 4, 1),
    )
    .await
    .unwrap();

    assert!(created.is_empty());
    assert!(repo.list_forecasts(None).await.unwrap().is_empty());
}

// =============================================================================
// Simulation Workflow
// =============================================================================

#[tokio::test]
async fn test_simulation_history_accumulates() {
    for repo in repositories() {
        seed_sample_data(repo.as_ref()).await.unwrap();
        let engine = SimulationEngine::default();

        let neutral = run_simulation(repo.as_ref(), &engine, &SimulationRequest::new(0.0, 0.0, 0.0))
            .await
            .unwrap();
        assert_eq!(neutral.projected_sales_value, 168000.0);
        assert_eq!(neutral.roi, 0.0);

        let price_up =
            run_simulation(repo.as_ref(), &engine, &SimulationRequest::new(10.0, 0.0, 0.0))
                .await
                .unwrap();
        assert_eq!(price_up.projected_sales_value, 154560.0);
        assert_eq!(price_up.incremental_revenue, -13440.0);
        assert_eq!(price_up.investment_cost, 0.0);

        let history = repo.list_simulations().await.unwrap();
        assert_eq!(history.len(), 2, "store: {}", repo.kind());
        assert_eq!(history[1], price_up);
    }
}

// =============================================================================
// Insight Workflow
// =============================================================================

#[tokio::test]
async fn test_sample_data_yields_all_insight_types() {
    for repo in repositories() {
        seed_sample_data(repo.as_ref()).await.unwrap();

        let created = InsightEngine::new()
            .generate(repo.as_ref(), None)
            .await
            .unwrap();
        assert!(created.len() >= 3);

        for insight_type in [InsightType::Growth, InsightType::Risk, InsightType::Opportunity] {
            assert!(
                created.iter().any(|i| i.insight_type == insight_type),
                "missing {} in {}",
                insight_type,
                repo.kind()
            );
        }
    }
}

#[tokio::test]
async fn test_repeated_generation_accumulates() {
    let repo = MemoryRepository::new();
    seed_sample_data(&repo).await.unwrap();
    let engine = InsightEngine::new();

    let first = engine.generate(&repo, None).await.unwrap().len();
    let second = engine.generate(&repo, None).await.unwrap().len();

    assert_eq!(first, 5);
    assert_eq!(second, 5);
    assert_eq!(repo.list_insights(None).await.unwrap().len(), 10);
    assert_eq!(
        repo.list_insights(Some(InsightType::Risk)).await.unwrap().len(),
        4
    );
}

#[tokio::test]
async fn test_segment_update_changes_rule_outcome() {
    let repo = SqliteRepository::in_memory().unwrap();
    seed_sample_data(&repo).await.unwrap();

    let loyal = repo
        .list_segments()
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.segment_name == "Loyal")
        .unwrap();
    repo.update_segment(
        loyal.id,
        SegmentUpdate {
            customer_count: Some(2500),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let created = InsightEngine::new().generate(&repo, None).await.unwrap();
    assert!(!created
        .iter()
        .any(|i| i.title == "Loyalty Program Enhancement"));
    assert_eq!(created.len(), 4);
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_uses_stored_segments() {
    let repo = MemoryRepository::new();
    seed_sample_data(&repo).await.unwrap();

    let answer = chat::answer_question(&repo, Some(&AIClient::mock()), "How loyal are buyers?")
        .await
        .unwrap();
    assert!(answer.contains("809 loyal customers"));
    assert!(answer.contains("($27.3 vs $19.1 average)"));
}
