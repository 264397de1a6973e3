//! Behaviour every [`RecordStore`] backend must share.

use serde_json::json;
use vidstore_core::{NewVideo, VideoId, VideoRecord};

use crate::store::RecordStore;

pub(crate) async fn exercise(store: &dyn RecordStore) {
    assert!(store.list().await.unwrap().is_empty());
    store.ping().await.unwrap();

    // create then get returns the stored values, servers order included
    let servers = json!([
        {"name": "Server2", "qualities": [{"res": "1080p", "url": "https://cdn.example.com/b.m3u8"}]},
        {"name": "Server1", "qualities": [{"res": "720p", "url": "https://example.com/a.mp4"}],
         "subtitles": [{"lang": "en", "url": "https://example.com/a.vtt"}]}
    ]);
    let demo = store
        .create(NewVideo::new(Some("Demo".into()), Some(servers.clone())).unwrap())
        .await
        .unwrap();
    assert_eq!(demo.title, "Demo");

    let fetched = store.get(demo.id).await.unwrap().unwrap();
    assert_eq!(fetched, demo);
    assert_eq!(serde_json::Value::Array(fetched.servers), servers);

    // omitted title falls back to the id-derived default
    let untitled = store
        .create(NewVideo::new(None, Some(json!([{"name": "S"}]))).unwrap())
        .await
        .unwrap();
    assert_eq!(untitled.title, VideoRecord::default_title(untitled.id));
    assert_eq!(store.get(untitled.id).await.unwrap().unwrap(), untitled);

    // identical input yields a distinct, independently retrievable record
    let twin = store
        .create(NewVideo::new(Some("Demo".into()), Some(servers.clone())).unwrap())
        .await
        .unwrap();
    assert_ne!(twin.id, demo.id);
    assert!(store.get(twin.id).await.unwrap().is_some());
    assert!(store.get(demo.id).await.unwrap().is_some());

    // unknown and malformed ids are simply absent
    assert!(store.get(VideoId::new()).await.unwrap().is_none());
    assert!(store.get_by_str("").await.unwrap().is_none());
    assert!(store.get_by_str("nope").await.unwrap().is_none());
    assert_eq!(
        store.get_by_str(&demo.id.to_string()).await.unwrap(),
        Some(demo.clone())
    );

    // list returns exactly what was created
    let mut listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 3);
    listed.sort_by_key(|r| r.id);
    let mut expected = vec![demo, untitled, twin];
    expected.sort_by_key(|r| r.id);
    assert_eq!(listed, expected);
}
