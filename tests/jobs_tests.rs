use talentbase::TestApp;

async fn create_advert(app: &TestApp, token: &str, title: &str, location: &str) -> i64 {
    let body = serde_json::json!({
        "title": title,
        "company_name": "Acme Ltd",
        "location": location,
        "description": format!("We are hiring a {}", title),
    });
    let res = app
        .client
        .post_with_auth(&app.url("/api/jobs"), token, &body.to_string())
        .await;
    assert_eq!(res.status, 200, "Create advert failed: {}", res.body);
    res.data()["id"].as_i64().unwrap()
}

async fn apply(app: &TestApp, advert_id: i64, name: &str, email: &str) -> i64 {
    let body = serde_json::json!({ "name": name, "email": email });
    let res = app
        .post(&format!("/api/jobs/{}/apply", advert_id), &body.to_string())
        .await;
    assert_eq!(res.status, 200, "Apply failed: {}", res.body);
    res.data()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_advert_requires_auth() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "title": "Engineer",
        "company_name": "Acme Ltd",
        "location": "London",
        "description": "Engineering things",
    });
    let res = app.post("/api/jobs", &body.to_string()).await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn test_create_and_fetch_advert() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_verified_user("employer@example.com", "password123")
        .await;

    let id = create_advert(&app, &token, "Rust Engineer", "Berlin").await;

    let res = app.get(&format!("/api/jobs/{}", id)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["title"], "Rust Engineer");
    assert_eq!(res.data()["company_name"], "Acme Ltd");

    let res = app.get("/api/jobs").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_advert_missing_fields() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_verified_user("employer@example.com", "password123")
        .await;

    let body = serde_json::json!({
        "title": "",
        "company_name": "Acme Ltd",
        "location": "London",
        "description": "x",
    });
    let res = app
        .client
        .post_with_auth(&app.url("/api/jobs"), &token, &body.to_string())
        .await;

    assert_eq!(res.status, 422);
}

#[tokio::test]
async fn test_update_advert_owner_only() {
    let app = TestApp::new().await;
    let (owner, _) = app
        .create_verified_user("owner@example.com", "password123")
        .await;
    let (intruder, _) = app
        .create_verified_user("intruder@example.com", "password123")
        .await;

    let id = create_advert(&app, &owner, "Backend Engineer", "Oslo").await;

    let body = serde_json::json!({
        "title": "Senior Backend Engineer",
        "company_name": "Acme Ltd",
        "location": "Oslo",
        "description": "More seniority",
    });

    let res = app
        .client
        .put_with_auth(&app.url(&format!("/api/jobs/{}", id)), &intruder, &body.to_string())
        .await;
    assert_eq!(res.status, 403);

    let res = app
        .client
        .put_with_auth(&app.url(&format!("/api/jobs/{}", id)), &owner, &body.to_string())
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["title"], "Senior Backend Engineer");
}

#[tokio::test]
async fn test_delete_advert_owner_only() {
    let app = TestApp::new().await;
    let (owner, _) = app
        .create_verified_user("owner@example.com", "password123")
        .await;
    let (intruder, _) = app
        .create_verified_user("intruder@example.com", "password123")
        .await;

    let id = create_advert(&app, &owner, "Data Engineer", "Paris").await;

    let res = app
        .client
        .delete_with_auth(&app.url(&format!("/api/jobs/{}", id)), &intruder)
        .await;
    assert_eq!(res.status, 403);

    let res = app
        .client
        .delete_with_auth(&app.url(&format!("/api/jobs/{}", id)), &owner)
        .await;
    assert_eq!(res.status, 200);

    let res = app.get(&format!("/api/jobs/{}", id)).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_apply_once_per_email() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_verified_user("employer@example.com", "password123")
        .await;
    let id = create_advert(&app, &token, "QA Engineer", "Remote").await;

    apply(&app, id, "Sam", "sam@example.com").await;

    let body = serde_json::json!({ "name": "Sam", "email": "sam@example.com" });
    let res = app
        .post(&format!("/api/jobs/{}/apply", id), &body.to_string())
        .await;
    assert_eq!(res.status, 409);

    // A different address still goes through
    let body = serde_json::json!({ "name": "Alex", "email": "alex@example.com" });
    let res = app
        .post(&format!("/api/jobs/{}/apply", id), &body.to_string())
        .await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn test_advert_applications_owner_only() {
    let app = TestApp::new().await;
    let (owner, _) = app
        .create_verified_user("owner@example.com", "password123")
        .await;
    let (intruder, _) = app
        .create_verified_user("intruder@example.com", "password123")
        .await;

    let id = create_advert(&app, &owner, "Designer", "Lisbon").await;
    apply(&app, id, "Sam", "sam@example.com").await;

    let res = app
        .client
        .get_with_auth(&app.url(&format!("/api/jobs/{}/applications", id)), &intruder)
        .await;
    assert_eq!(res.status, 403);

    let res = app
        .client
        .get_with_auth(&app.url(&format!("/api/jobs/{}/applications", id)), &owner)
        .await;
    assert_eq!(res.status, 200);
    let applications = res.data();
    assert_eq!(applications.as_array().unwrap().len(), 1);
    assert_eq!(applications[0]["email"], "sam@example.com");
    assert_eq!(applications[0]["status"], "applied");
}

#[tokio::test]
async fn test_decide_rejects_unknown_status() {
    let app = TestApp::new().await;
    let (owner, _) = app
        .create_verified_user("owner@example.com", "password123")
        .await;
    let id = create_advert(&app, &owner, "PM", "Madrid").await;
    let application_id = apply(&app, id, "Sam", "sam@example.com").await;

    let body = serde_json::json!({ "status": "hired" });
    let res = app
        .client
        .post_with_auth(
            &app.url(&format!("/api/applications/{}/decide", application_id)),
            &owner,
            &body.to_string(),
        )
        .await;

    assert_eq!(res.status, 422);
}

#[tokio::test]
async fn test_rejection_sends_outcome_email() {
    let app = TestApp::new().await;
    let (owner, _) = app
        .create_verified_user("owner@example.com", "password123")
        .await;
    let id = create_advert(&app, &owner, "Analyst", "Dublin").await;
    let application_id = apply(&app, id, "Sam", "sam@example.com").await;

    let body = serde_json::json!({ "status": "rejected" });
    let res = app
        .client
        .post_with_auth(
            &app.url(&format!("/api/applications/{}/decide", application_id)),
            &owner,
            &body.to_string(),
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["status"], "rejected");

    let mail = app.mailer.last_message_to("sam@example.com").unwrap();
    assert!(mail.subject.contains("Application Outcome"));
    assert!(mail.body.contains("Analyst"));
}

#[tokio::test]
async fn test_notifications_cleared_by_viewing_applications() {
    let app = TestApp::new().await;
    let (owner, _) = app
        .create_verified_user("owner@example.com", "password123")
        .await;
    let (applicant, _) = app
        .create_verified_user("sam@example.com", "password123")
        .await;

    let id = create_advert(&app, &owner, "SRE", "Stockholm").await;
    let application_id = apply(&app, id, "Sam", "sam@example.com").await;

    // Nothing decided yet
    let res = app
        .client
        .get_with_auth(&app.url("/api/me/notifications"), &applicant)
        .await;
    assert_eq!(res.data()["unseen_decisions"], 0);

    let body = serde_json::json!({ "status": "interview" });
    app.client
        .post_with_auth(
            &app.url(&format!("/api/applications/{}/decide", application_id)),
            &owner,
            &body.to_string(),
        )
        .await;

    let res = app
        .client
        .get_with_auth(&app.url("/api/me/notifications"), &applicant)
        .await;
    assert_eq!(res.data()["unseen_decisions"], 1);

    // Listing own applications marks decisions as seen
    let res = app
        .client
        .get_with_auth(&app.url("/api/me/applications"), &applicant)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()[0]["status"], "interview");

    let res = app
        .client
        .get_with_auth(&app.url("/api/me/notifications"), &applicant)
        .await;
    assert_eq!(res.data()["unseen_decisions"], 0);
}

#[tokio::test]
async fn test_my_jobs_lists_only_own_adverts() {
    let app = TestApp::new().await;
    let (a, _) = app
        .create_verified_user("a@example.com", "password123")
        .await;
    let (b, _) = app
        .create_verified_user("b@example.com", "password123")
        .await;

    create_advert(&app, &a, "Role A", "Rome").await;
    create_advert(&app, &b, "Role B", "Rome").await;

    let res = app.client.get_with_auth(&app.url("/api/me/jobs"), &a).await;
    let adverts = res.data();
    assert_eq!(adverts.as_array().unwrap().len(), 1);
    assert_eq!(adverts[0]["title"], "Role A");
}

#[tokio::test]
async fn test_search_by_keyword_and_location() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_verified_user("employer@example.com", "password123")
        .await;

    create_advert(&app, &token, "Rust Engineer", "Berlin").await;
    create_advert(&app, &token, "Python Engineer", "Berlin").await;
    create_advert(&app, &token, "Rust Engineer", "Tokyo").await;

    let res = app.get("/api/jobs/search?keyword=Rust").await;
    assert_eq!(res.data().as_array().unwrap().len(), 2);

    // Matching is case-insensitive regardless of backend collation
    let res = app.get("/api/jobs/search?keyword=rUsT").await;
    assert_eq!(res.data().as_array().unwrap().len(), 2);

    let res = app.get("/api/jobs/search?location=berlin").await;
    assert_eq!(res.data().as_array().unwrap().len(), 2);

    let res = app.get("/api/jobs/search?keyword=Rust&location=Berlin").await;
    assert_eq!(res.data().as_array().unwrap().len(), 1);

    let res = app.get("/api/jobs/search?location=Tokyo").await;
    assert_eq!(res.data().as_array().unwrap().len(), 1);

    // No filters returns everything
    let res = app.get("/api/jobs/search").await;
    assert_eq!(res.data().as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_stats() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_verified_user("employer@example.com", "password123")
        .await;

    let id = create_advert(&app, &token, "Engineer", "Berlin").await;
    let first = apply(&app, id, "Sam", "sam@example.com").await;
    apply(&app, id, "Alex", "alex@example.com").await;

    let body = serde_json::json!({ "status": "interview" });
    app.client
        .post_with_auth(
            &app.url(&format!("/api/applications/{}/decide", first)),
            &token,
            &body.to_string(),
        )
        .await;

    let res = app.get("/api/stats").await;
    assert_eq!(res.status, 200);
    let stats = res.data();
    assert_eq!(stats["total_users"], 1);
    assert_eq!(stats["total_job_adverts"], 1);
    assert_eq!(stats["total_applications"], 2);
    assert_eq!(stats["success_rate"], 50);
}
