//! End-to-end survey flow over a real listener

mod common;

use radstudy_core::PresentationPackage;
use radstudy_core::sink::JsonlSink;
use reqwest::StatusCode;
use reqwest::redirect::Policy;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn participant_sees_same_assignment_and_can_submit() {
    let dir = tempfile::tempdir().unwrap();
    common::write_assets(dir.path());
    let responses = dir.path().join("out").join("responses.jsonl");
    let state = common::load_state(dir.path(), &responses).await;
    let (_state, addr) = common::spawn_server(state).await;
    let client = client();

    let url = format!("http://{addr}/?uid=u1");
    let first: PresentationPackage = client.get(&url).send().await.unwrap().json().await.unwrap();
    let second: PresentationPackage = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(first, second);

    assert_eq!(first.seed.value(), 41_909_017);
    assert_eq!(first.order, "0,1,3,2");
    assert_eq!(first.guidance_bits.matches('1').count(), 2);
    let guided: Vec<usize> = first
        .questions
        .iter()
        .filter(|q| q.show_guidance)
        .map(|q| q.case_index)
        .collect();
    assert_eq!(guided, vec![1, 3]);

    let shortness = first.questions.iter().find(|q| q.case_index == 3).unwrap();
    assert_eq!(shortness.guidance.len(), 2);
    assert_eq!(shortness.guidance[0].rows.len(), 2);

    let mut form = vec![("uid".to_string(), "u1".to_string())];
    for (i, question) in first.questions.iter().enumerate() {
        let answer = if i == 0 { "Xray-ish" } else { "Radiography chest" };
        form.push((format!("Q{}", question.case_index), answer.to_string()));
    }
    form.push(("sort_idxs".to_string(), first.order.clone()));
    form.push(("with_guidance".to_string(), first.guidance_bits.clone()));
    form.push(("timed".to_string(), first.condition.as_flag().to_string()));
    form.push(("seed".to_string(), first.seed.to_string()));
    form.push(("duration".to_string(), "241".to_string()));
    form.push(("name".to_string(), String::new()));

    let response = client
        .post(format!("http://{addr}/api/v1/submit"))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/success");

    let stored = JsonlSink::new(responses).read_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(
        stored[0].wire_entries(),
        vec!["Q0,A-1,0", "Q1,A0,1", "Q3,A0,1", "Q2,A0,0"]
    );
    assert_eq!(stored[0].duration.as_deref(), Some("241"));
}

#[tokio::test]
async fn health_reports_loaded_catalog() {
    let dir = tempfile::tempdir().unwrap();
    common::write_assets(dir.path());
    let state = common::load_state(dir.path(), &dir.path().join("responses.jsonl")).await;
    let (_state, addr) = common::spawn_server(state).await;

    let health: serde_json::Value = client()
        .get(format!("http://{addr}/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["cases"], 4);
    assert_eq!(health["storage"], "jsonl");
}
