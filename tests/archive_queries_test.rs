use konzertarchiv::checks;
use konzertarchiv::comparison;
use konzertarchiv::queries::{NamedQuery, QueryCatalog, DEFAULT_BASE_IRI, RELEASE_PREFIX};
use konzertarchiv::querying::oxigraph_adapter::OxigraphEngine;
use konzertarchiv::querying::query_processing::QueryRunner;
use konzertarchiv::results::{json, XSD_BOOLEAN};
use konzertarchiv::{ResultSet, Term};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/archive.trig");

/// Runner over the fixture archive with the default base IRI
fn fixture_runner() -> QueryRunner<OxigraphEngine> {
    let engine = OxigraphEngine::from_files(&[FIXTURE]).unwrap();
    let catalog = QueryCatalog::embedded().with_base_iri(Some(DEFAULT_BASE_IRI.to_string()));
    QueryRunner::with_catalog(engine, catalog)
}

fn column<'a>(results: &'a ResultSet, variable: &str) -> Vec<&'a str> {
    results.iter().map(|row| row.lexical(variable).unwrap_or("")).collect()
}

#[tokio::test]
async fn test_releases_query_rows_and_order() {
    let runner = fixture_runner();
    let results = runner.execute(NamedQuery::NewYearsReleases).await.unwrap();

    assert_eq!(results.variables, NamedQuery::NewYearsReleases.projected_variables());
    assert_eq!(column(&results, "year"), vec!["1987", "1987", "1987", "1992", "1992"]);
    assert_eq!(column(&results, "trackNum"), vec!["1", "3", "10", "1", "2"]);
    assert_eq!(
        column(&results, "title"),
        vec![
            "Ohne Sorgen",
            "Donau",
            "Radetzky-Marsch",
            "Donauweibchen",
            "An der schönen blauen Donau"
        ]
    );
    assert!(checks::verify(NamedQuery::NewYearsReleases, &results).is_empty());
}

#[tokio::test]
async fn test_releases_query_year_is_release_suffix() {
    let runner = fixture_runner();
    let results = runner.execute(NamedQuery::NewYearsReleases).await.unwrap();

    for row in &results {
        let release = row.lexical("release").unwrap();
        assert!(release.contains("Neujahrskonzerte"));
        assert!(release.starts_with(RELEASE_PREFIX));
        assert_eq!(checks::trailing_year(release), row.lexical("year"));
    }
}

#[tokio::test]
async fn test_releases_query_excludes_non_digit_suffix() {
    let runner = fixture_runner();
    let results = runner.execute(NamedQuery::NewYearsReleases).await.unwrap();

    assert!(results
        .iter()
        .all(|row| !row.lexical("release").unwrap().ends_with("/Neujahrskonzerte/abcd")));
    assert!(results.iter().all(|row| !row.lexical("release").unwrap().contains("Studio")));
}

#[tokio::test]
async fn test_donau_track_appears_in_releases_and_danube_queries() {
    let runner = fixture_runner();

    let releases = runner.execute(NamedQuery::NewYearsReleases).await.unwrap();
    let donau = releases
        .iter()
        .find(|row| row.lexical("title") == Some("Donau"))
        .expect("Donau track in releases");
    assert_eq!(donau.lexical("year"), Some("1987"));
    assert_eq!(donau.get("trackNum").and_then(Term::as_integer), Some(3));
    assert_eq!(
        donau.lexical("release"),
        Some("http://neujahrskonzert.local/release/Neujahrskonzerte/1987")
    );

    let danube = runner.execute(NamedQuery::DanubeTracks).await.unwrap();
    let donau = danube
        .iter()
        .find(|row| row.lexical("title") == Some("Donau"))
        .expect("Donau track in danube titles");
    assert_eq!(donau.get("isNewYearsConcert"), Some(&Term::typed_literal("true", XSD_BOOLEAN)));
}

#[tokio::test]
async fn test_danube_query_filters_and_flags() {
    let runner = fixture_runner();
    let results = runner.execute(NamedQuery::DanubeTracks).await.unwrap();

    // ordered by track IRI: Neujahrskonzerte/1987, /1992, /abcd, then Studio
    assert_eq!(
        column(&results, "title"),
        vec!["Donau", "An der schönen blauen Donau", "Donau so blau", "Donaulieder"]
    );
    let flags: Vec<Option<bool>> = results
        .iter()
        .map(|row| row.get("isNewYearsConcert").and_then(Term::as_bool))
        .collect();
    assert_eq!(flags, vec![Some(true), Some(true), Some(true), Some(false)]);

    assert!(results.iter().all(|row| !row.lexical("title").unwrap().contains("eibchen")));
    assert!(checks::verify(NamedQuery::DanubeTracks, &results).is_empty());
}

#[tokio::test]
async fn test_danube_flag_matches_track_iri() {
    let runner = fixture_runner();
    // Same query, also projecting the track so the flag can be checked.
    let text = runner
        .catalog()
        .text(NamedQuery::DanubeTracks)
        .unwrap()
        .replace("SELECT ?title", "SELECT ?track ?title");
    let results = runner.execute_text(&text).await.unwrap();

    assert_eq!(results.len(), 4);
    for row in &results {
        let expected = row.lexical("track").unwrap().contains("track/Neujahrskonzerte");
        assert_eq!(row.get("isNewYearsConcert").and_then(Term::as_bool), Some(expected));
    }
}

#[tokio::test]
async fn test_programmes_query_keeps_first_of_january_only() {
    let runner = fixture_runner();
    let results = runner.execute(NamedQuery::NewYearsProgrammes).await.unwrap();

    assert_eq!(results.len(), 5);
    let mut years = column(&results, "year");
    years.sort_unstable();
    assert_eq!(years, vec!["1987", "1987", "1987", "1992", "2001"]);

    let titles = column(&results, "programmeItemTitle");
    assert!(!titles.contains(&"Die Fledermaus"));
    assert!(!titles.contains(&"Frühlingsstimmen"));

    let karajan = results
        .iter()
        .filter(|row| row.lexical("conductor") == Some("Herbert von Karajan"))
        .count();
    assert_eq!(karajan, 3);
    assert!(checks::verify(NamedQuery::NewYearsProgrammes, &results).is_empty());
}

#[tokio::test]
async fn test_programmes_year_is_date_prefix() {
    let runner = fixture_runner();
    let text = runner
        .catalog()
        .text(NamedQuery::NewYearsProgrammes)
        .unwrap()
        .replace("SELECT ?concert", "SELECT ?date ?concert");
    let results = runner.execute_text(&text).await.unwrap();

    assert_eq!(results.len(), 5);
    for row in &results {
        let date = row.lexical("date").unwrap();
        assert_eq!(&date[5..], "01-01");
        assert_eq!(row.lexical("year"), Some(&date[..4]));
    }
}

#[tokio::test]
async fn test_queries_are_idempotent() {
    let runner = fixture_runner();
    for query in NamedQuery::ALL {
        let first = runner.execute(query).await.unwrap();
        let second = runner.execute(query).await.unwrap();
        assert_eq!(first, second, "{} changed between runs", query);
        assert_eq!(json::to_string(&first).unwrap(), json::to_string(&second).unwrap());
    }
}

#[tokio::test]
async fn test_execute_all_runs_every_query() {
    let runner = fixture_runner();
    let outcomes = runner.execute_all().await;

    let names: Vec<NamedQuery> = outcomes.iter().map(|(q, _)| *q).collect();
    assert_eq!(names, NamedQuery::ALL.to_vec());
    for (query, outcome) in outcomes {
        let results = outcome.unwrap();
        assert!(!results.is_empty(), "{} returned nothing", query);
    }
}

#[tokio::test]
async fn test_comparison_of_fixture_archives() {
    let runner = fixture_runner();
    let recordings = runner.execute(NamedQuery::NewYearsReleases).await.unwrap();
    let programmes = runner.execute(NamedQuery::NewYearsProgrammes).await.unwrap();

    let report = comparison::compare(&recordings, &programmes);
    assert_eq!(report.in_both.iter().collect::<Vec<_>>(), vec!["1987", "1992"]);
    assert!(report.recordings_only.is_empty());
    assert_eq!(report.programmes_only.iter().collect::<Vec<_>>(), vec!["2001"]);

    let y1987 = &report.differences["1987"];
    assert_eq!(y1987.recorded_only.iter().collect::<Vec<_>>(), vec!["Donau"]);
    assert_eq!(
        y1987.programmed_only.iter().collect::<Vec<_>>(),
        vec!["An der schönen blauen Donau"]
    );

    let y1992 = &report.differences["1992"];
    assert_eq!(
        y1992.recorded_only.iter().collect::<Vec<_>>(),
        vec!["An der schönen blauen Donau"]
    );
    assert!(y1992.programmed_only.is_empty());
}

#[tokio::test]
async fn test_missing_base_iri_is_a_syntax_error_locally() {
    let engine = OxigraphEngine::from_files(&[FIXTURE]).unwrap();
    let runner = QueryRunner::new(engine);
    let err = runner.execute(NamedQuery::NewYearsReleases).await.unwrap_err();
    assert_eq!(err.kind(), "QuerySyntaxError");
}

#[tokio::test]
async fn test_edited_query_with_wrong_projection_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("danube_tracks.rq"),
        "SELECT ?title WHERE { GRAPH ?g { ?t <http://www.w3.org/2000/01/rdf-schema#label> ?title } }",
    )
    .unwrap();

    let engine = OxigraphEngine::from_files(&[FIXTURE]).unwrap();
    let catalog = QueryCatalog::from_directory(dir.path())
        .with_base_iri(Some(DEFAULT_BASE_IRI.to_string()));
    let runner = QueryRunner::with_catalog(engine, catalog);

    let err = runner.execute(NamedQuery::DanubeTracks).await.unwrap_err();
    assert_eq!(err.kind(), "UnexpectedResultShape");
}
