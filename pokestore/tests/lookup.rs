use pokestore::{errors::StorageError, models::PokemonSummary};

mod common;

use common::{init_test_context, record, MockRemote, API_URL};

#[tokio::test]
async fn local_hit_skips_remote() -> anyhow::Result<()> {
    let ctx = init_test_context(MockRemote::with_records(vec![record(25, "pikachu-remote")]))?;
    ctx.store.catalog.upsert_record(&record(25, "pikachu"))?;

    let summaries = ctx.store.lookup_summaries(Some("PIKA")).await?;
    assert_eq!(summaries, vec![PokemonSummary::from_base("pikachu", API_URL, 25)]);

    let records = ctx.store.lookup_records(Some("25")).await?;
    assert_eq!(records, vec![record(25, "pikachu")]);

    assert_eq!(ctx.remote.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn local_miss_falls_back_to_remote() -> anyhow::Result<()> {
    let ctx = init_test_context(MockRemote::with_records(vec![record(25, "pikachu")]))?;

    let summaries = ctx.store.lookup_summaries(Some("25")).await?;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "pikachu");
    assert_eq!(summaries[0].resource, format!("{API_URL}25/"));

    let records = ctx.store.lookup_records(Some("Pikachu")).await?;
    assert_eq!(records, vec![record(25, "pikachu")]);
    assert_eq!(ctx.remote.call_count(), 2);

    // remote hits are not written back by reads
    assert_eq!(ctx.store.catalog.count()?, 0);
    Ok(())
}

#[tokio::test]
async fn remote_miss_or_failure_yields_empty_list() -> anyhow::Result<()> {
    let ctx = init_test_context(MockRemote::with_records(vec![record(25, "pikachu")]))?;
    assert!(ctx.store.lookup_summaries(Some("mewtwo")).await?.is_empty());
    assert!(ctx.store.lookup_records(Some("9999")).await?.is_empty());

    let ctx = init_test_context(MockRemote::unavailable())?;
    assert!(ctx.store.lookup_summaries(Some("pikachu")).await?.is_empty());
    assert!(ctx.store.lookup_records(Some("pikachu")).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn listing_merge_prefers_local_records() -> anyhow::Result<()> {
    let ctx = init_test_context(MockRemote::with_records(vec![
        record(25, "pikachu-old"),
        record(1, "bulbasaur"),
    ]))?;
    ctx.store.catalog.upsert_record(&record(25, "pikachu"))?;

    let summaries = ctx.store.lookup_summaries(None).await?;
    assert_eq!(summaries.len(), 2);
    assert!(summaries.contains(&PokemonSummary::from_base("pikachu", API_URL, 25)));
    assert!(summaries.contains(&PokemonSummary::from_base("bulbasaur", API_URL, 1)));

    let records = ctx.store.lookup_records(None).await?;
    assert_eq!(records.len(), 2);
    let pikachu = records.iter().find(|r| r.id == 25).expect("id 25 present");
    assert_eq!(pikachu, &record(25, "pikachu"));
    assert!(records.iter().any(|r| r.id == 1 && r.name == "bulbasaur"));
    Ok(())
}

#[tokio::test]
async fn listing_survives_remote_outage() -> anyhow::Result<()> {
    let ctx = init_test_context(MockRemote::unavailable())?;
    ctx.store.catalog.upsert_record(&record(25, "pikachu"))?;

    let summaries = ctx.store.lookup_summaries(Some("")).await?;
    assert_eq!(summaries, vec![PokemonSummary::from_base("pikachu", API_URL, 25)]);

    let records = ctx.store.lookup_records(None).await?;
    assert_eq!(records, vec![record(25, "pikachu")]);
    Ok(())
}

#[tokio::test]
async fn malformed_remote_resource_aborts_listing() -> anyhow::Result<()> {
    let remote = MockRemote {
        records: vec![record(1, "bulbasaur")],
        extra_summaries: vec![PokemonSummary::new("ghost", "https://pokeapi.co/api/v2/ghost")],
        ..Default::default()
    };
    let ctx = init_test_context(remote)?;

    let err = ctx.store.lookup_summaries(None).await.unwrap_err();
    assert!(matches!(err, StorageError::MalformedResource(ref r) if r.contains("ghost")));
    Ok(())
}

#[tokio::test]
async fn detailed_lookup_is_idempotent() -> anyhow::Result<()> {
    let ctx = init_test_context(MockRemote::with_records(vec![record(1, "bulbasaur")]))?;
    ctx.store.catalog.upsert_record(&record(25, "pikachu"))?;

    for query in [Some("25"), Some("1"), None] {
        let first = ctx.store.lookup_records(query).await?;
        let second = ctx.store.lookup_records(query).await?;
        assert_eq!(first, second);
    }
    Ok(())
}
