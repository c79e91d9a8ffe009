//! Insight, summary and question commands

use anyhow::{Context, Result};
use shelfscope_core::{chat, AIClient, Insight, InsightEngine, InsightType, Repository};

use super::truncate;

fn type_icon(insight_type: InsightType) -> &'static str {
    match insight_type {
        InsightType::Growth => "📈",
        InsightType::Risk => "⚠️ ",
        InsightType::Opportunity => "💡",
    }
}

fn print_insights(insights: &[Insight]) {
    for insight in insights {
        println!(
            "   {} [{:>3}] {:40} │ {:.0}% confidence",
            type_icon(insight.insight_type),
            insight.id,
            truncate(&insight.title, 40),
            insight.confidence * 100.0
        );
        println!("         {}", insight.description);
        println!("         → {}", insight.recommendation);
    }
}

pub async fn cmd_insights_generate(repo: &dyn Repository, ai: Option<&AIClient>) -> Result<()> {
    println!("🔍 Generating insights...");
    match ai {
        Some(client) => println!("   🤖 Augmenting with the {} backend", client.kind()),
        None => println!("   💡 Tip: Set AI_BACKEND=mock or openai_compatible for extra recommendations"),
    }

    let created = InsightEngine::new()
        .generate(repo, ai)
        .await
        .context("Insight generation failed")?;

    println!();
    if created.is_empty() {
        println!("✅ No rules matched the current data.");
        return Ok(());
    }

    println!("📊 {} insights generated", created.len());
    println!("   ─────────────────────────────────────────────────────────────");
    print_insights(&created);

    Ok(())
}

pub async fn cmd_insights_list(repo: &dyn Repository, insight_type: Option<&str>) -> Result<()> {
    let filter = insight_type
        .map(|t| t.parse::<InsightType>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let insights = repo.list_insights(filter).await?;

    if insights.is_empty() {
        println!("No insights stored yet. Run:");
        println!("  shelfscope insights generate");
        return Ok(());
    }

    println!();
    println!("📋 Stored Insights ({})", insights.len());
    println!("   ─────────────────────────────────────────────────────────────");
    print_insights(&insights);

    Ok(())
}

pub async fn cmd_summary(repo: &dyn Repository, ai: Option<&AIClient>) -> Result<()> {
    let summary = chat::performance_summary(repo, ai).await?;
    println!();
    println!("{}", summary);
    Ok(())
}

pub async fn cmd_ask(repo: &dyn Repository, ai: Option<&AIClient>, question: &str) -> Result<()> {
    let answer = chat::answer_question(repo, ai, question).await?;
    println!();
    println!("{}", answer);
    Ok(())
}
