//! HTTP-level tests for CSV exports, the ZIP archive and project import.

mod common;

use std::io::{Cursor, Read};

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, body_text, create_project, get_auth, post_bytes_auth, token_with_role,
};
use pmo_core::roles::{ROLE_PROJECT_MANAGER, ROLE_STAKEHOLDER};
use sqlx::PgPool;
use zip::ZipArchive;

#[sqlx::test(migrations = "../../db/migrations")]
async fn projects_csv_is_an_attachment(pool: PgPool) {
    let token = token_with_role(&pool, "pm", ROLE_PROJECT_MANAGER).await;
    create_project(common::build_test_app(pool.clone()), &token, "PRJ-1", "Alpha, Phase 2").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/export/projects.csv", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/csv");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"projects.csv\""
    );

    let text = body_text(response).await;
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("project_id,project_name,start_date,end_date,budget,status")
    );
    assert!(lines.next().unwrap().contains("\"Alpha, Phase 2\""));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_exports_still_have_headers(pool: PgPool) {
    let token = token_with_role(&pool, "viewer", ROLE_STAKEHOLDER).await;

    for (uri, header) in [
        ("/api/v1/export/tasks.csv", "task_id,project_id,task_name"),
        ("/api/v1/export/risks.csv", "risk_id,project_id,risk_type"),
        ("/api/v1/export/resources.csv", "resource_id,name,role"),
    ] {
        let app = common::build_test_app(pool.clone());
        let response = get_auth(app, uri, &token).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let text = body_text(response).await;
        assert!(text.starts_with(header), "{uri}: {text}");
        assert_eq!(text.lines().count(), 1, "{uri}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn archive_bundles_all_four_files(pool: PgPool) {
    let token = token_with_role(&pool, "pm", ROLE_PROJECT_MANAGER).await;
    create_project(common::build_test_app(pool.clone()), &token, "PRJ-1", "Alpha").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/export/all.zip", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/zip");

    let bytes = body_bytes(response).await;
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<_> = archive.file_names().map(String::from).collect();
    names.sort_unstable();
    assert_eq!(names, ["projects.csv", "resources.csv", "risks.csv", "tasks.csv"]);

    let mut projects = String::new();
    archive
        .by_name("projects.csv")
        .unwrap()
        .read_to_string(&mut projects)
        .unwrap();
    assert!(projects.contains("Alpha"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_updates_known_projects_and_reports_the_rest(pool: PgPool) {
    let token = token_with_role(&pool, "pm", ROLE_PROJECT_MANAGER).await;
    let id = create_project(common::build_test_app(pool.clone()), &token, "PRJ-1", "Alpha").await;

    let csv = format!(
        "project_id,project_name,budget,status\n\
         {id},Alpha Reloaded,250000,Delayed\n\
         999999,Ghost,1,On Track\n\
         not-a-number,Broken,,\n"
    );
    let app = common::build_test_app(pool.clone());
    let response =
        post_bytes_auth(app, "/api/v1/import/projects.csv", "text/csv", csv, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["updated"], 1);
    assert_eq!(json["skipped"], 1);
    assert_eq!(json["errors"][0]["line"], 4);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, &format!("/api/v1/projects/{id}"), &token).await).await;
    assert_eq!(json["name"], "Alpha Reloaded");
    assert_eq!(json["status"], "delayed");
    assert_eq!(json["budget"], 250000.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_without_project_id_column_is_rejected(pool: PgPool) {
    let token = token_with_role(&pool, "pm", ROLE_PROJECT_MANAGER).await;
    let app = common::build_test_app(pool);

    let response = post_bytes_auth(
        app,
        "/api/v1/import/projects.csv",
        "text/csv",
        "name,budget\nAlpha,10\n",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_requires_editor_role(pool: PgPool) {
    let token = token_with_role(&pool, "viewer", ROLE_STAKEHOLDER).await;
    let app = common::build_test_app(pool);

    let response = post_bytes_auth(
        app,
        "/api/v1/import/projects.csv",
        "text/csv",
        "project_id\n1\n",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
