mod helpers;

use std::time::Duration;

use helpers::{TestServer, seed};
use quicknotes::{
    ClientConfig, Connectivity, ConnectivityMonitor, CreateNoteRequest, NoteStore, NotesApi,
    RefreshOutcome, RestClient, Selection, UpdateNoteRequest,
};

#[tokio::test]
async fn created_note_is_listed_once_after_refresh() {
    let server = TestServer::start().await;
    let mut store = NoteStore::new(server.client());
    store.select(Selection::Creating);

    let created = store
        .create(&CreateNoteRequest::new("Groceries", "milk"))
        .await
        .unwrap();
    assert_eq!(store.notes().len(), 1);
    assert_eq!(*store.selection(), Selection::Idle);

    store.refresh(None).await.unwrap();
    assert_eq!(store.notes().len(), 1);
    let listed = &store.notes()[0];
    assert_eq!(listed.id, created.id);
    assert_eq!(listed.title, "Groceries");
    assert_eq!(listed.content, "milk");
    assert_eq!(store.total(), 1);
}

#[tokio::test]
async fn refresh_started_before_delete_is_superseded() {
    let server = TestServer::start().await;
    let client = server.client();
    seed(&client, &[("keep", "k"), ("gone", "g")]).await;
    let mut store = NoteStore::new(client.clone());
    store.refresh(None).await.unwrap();
    let gone = store
        .notes()
        .iter()
        .find(|n| n.title == "gone")
        .map(|n| n.id)
        .unwrap();

    let pending = store.begin_refresh(None).fetch().await;
    store.delete(&gone).await.unwrap();

    assert_eq!(store.settle(pending).unwrap(), RefreshOutcome::Superseded);
    assert!(store.get(&gone).is_none());
    let remote = client.list_notes(&Default::default()).await.unwrap();
    assert_eq!(remote.notes.len(), store.notes().len());
}

#[tokio::test]
async fn search_scenario_keeps_only_matches_locally() {
    let server = TestServer::start().await;
    let client = server.client();
    seed(
        &client,
        &[
            ("Weekend shopping", "eggs"),
            ("Work", "report"),
            ("Reading", "novel"),
        ],
    )
    .await;
    let mut store = NoteStore::new(client);

    store.refresh(None).await.unwrap();
    assert_eq!(store.notes().len(), 3);

    let outcome = store.refresh(Some("shopping")).await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Applied { total: 1 });
    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.query(), Some("shopping"));
}

#[tokio::test]
async fn overlapping_refreshes_apply_only_the_latest() {
    let server = TestServer::start().await;
    let client = server.client();
    seed(&client, &[("alpha", "a"), ("beta", "b")]).await;
    let mut store = NoteStore::new(client);

    let stale = store.begin_refresh(Some("alpha")).fetch().await;
    let latest = store.begin_refresh(Some("beta")).fetch().await;

    let applied = store.settle(latest).unwrap();
    assert_eq!(applied, RefreshOutcome::Applied { total: 1 });
    assert_eq!(store.settle(stale).unwrap(), RefreshOutcome::Superseded);

    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.notes()[0].title, "beta");
    assert_eq!(store.query(), Some("beta"));
}

#[tokio::test]
async fn editing_selection_follows_successive_updates() {
    let server = TestServer::start().await;
    let mut store = NoteStore::new(server.client());
    let note = store
        .create(&CreateNoteRequest::new("Draft", "v0"))
        .await
        .unwrap();
    assert!(store.open(&note.id));

    let first = store
        .update(&note.id, &UpdateNoteRequest::default().content("v1"))
        .await
        .unwrap();
    let second = store
        .update(&note.id, &UpdateNoteRequest::default().title("Final"))
        .await
        .unwrap();

    assert!(first.updated_at > note.updated_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.get(&note.id), Some(&second));
    assert_eq!(store.selection().note(), Some(&second));
}

#[tokio::test]
async fn deleting_twice_reports_not_found_without_local_change() {
    let server = TestServer::start().await;
    let mut store = NoteStore::new(server.client());
    let keep = store
        .create(&CreateNoteRequest::new("keep", "k"))
        .await
        .unwrap();
    let gone = store
        .create(&CreateNoteRequest::new("drop", "d"))
        .await
        .unwrap();

    store.delete(&gone.id).await.unwrap();
    let err = store.delete(&gone.id).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.notes()[0].id, keep.id);
}

#[tokio::test]
async fn rejected_create_leaves_collection_unchanged() {
    let server = TestServer::start().await;
    let mut store = NoteStore::new(server.client());
    store.create(&CreateNoteRequest::new("one", "1")).await.unwrap();
    store.select(Selection::Creating);

    let err = store
        .create(&CreateNoteRequest::new("", "x"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(store.notes().len(), 1);
    assert!(store.selection().is_creating());
}

#[tokio::test]
async fn reload_picks_up_changes_made_elsewhere() {
    let server = TestServer::start().await;
    let client = server.client();
    let mut store = NoteStore::new(client.clone());
    let note = store
        .create(&CreateNoteRequest::new("Shared", "before"))
        .await
        .unwrap();

    client
        .update_note(&note.id, &UpdateNoteRequest::default().content("after"))
        .await
        .unwrap();
    let reloaded = store.reload(&note.id).await.unwrap();

    assert_eq!(reloaded.content, "after");
    assert_eq!(store.get(&note.id).map(|n| n.content.as_str()), Some("after"));
}

#[tokio::test]
async fn page_limit_caps_the_refreshed_page() {
    let server = TestServer::start().await;
    let client = server.client();
    seed(&client, &[("a", "1"), ("b", "2"), ("c", "3")]).await;
    let mut store = NoteStore::new(client).with_page_limit(Some(2));

    let outcome = store.refresh(None).await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Applied { total: 3 });
    assert_eq!(store.notes().len(), 2);
}

#[tokio::test]
async fn monitor_tracks_server_availability() {
    let server = TestServer::start().await;
    let client = server.client();
    let monitor = ConnectivityMonitor::new();

    assert!(monitor.check(client.as_ref()).await);
    assert_eq!(monitor.state(), Connectivity::Connected);

    let base_url = server.base_url.clone();
    drop(server);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let offline = RestClient::new(
        &ClientConfig::new(base_url).with_timeout(Duration::from_secs(2)),
    )
    .unwrap();
    let result = offline.list_notes(&Default::default()).await;
    monitor.observe(&result);

    assert!(result.unwrap_err().is_network());
    assert_eq!(monitor.state(), Connectivity::Disconnected);
}
