use stand_in::{InvocationFailure, Method, Mock};

trait Repository {
    async fn fetch(&self, id: u32) -> Result<String, InvocationFailure>;
    async fn store(&self, id: u32, value: String);
}

struct MockRepository {
    fetch: Method<u32, String>,
    store: Method<(u32, String), ()>,
}

impl MockRepository {
    fn new(mock: &Mock) -> Self {
        Self {
            fetch: mock.method("fetch").unwrap(),
            store: mock.method("store").unwrap(),
        }
    }
}

impl Repository for MockRepository {
    async fn fetch(&self, id: u32) -> Result<String, InvocationFailure> {
        self.fetch.try_invoke(id)
    }

    async fn store(&self, id: u32, value: String) {
        self.store.invoke((id, value))
    }
}

async fn copy_record(repo: &impl Repository, from: u32, to: u32) -> Result<(), InvocationFailure> {
    let value = repo.fetch(from).await?;
    repo.store(to, value.to_uppercase()).await;
    Ok(())
}

#[tokio::test]
async fn test_async_trait_methods_delegate_to_mock() {
    let mock = Mock::new("Repository");
    let repo = MockRepository::new(&mock);
    repo.fetch.when().with_args(1).returns("alpha".to_string());

    copy_record(&repo, 1, 2).await.unwrap();

    assert_eq!(repo.store.recorded_arguments(), vec![(2, "ALPHA".to_string())]);
    assert!(stand_in::verify(repo.fetch.calls_with(1) + repo.store.calls()).passed());
}

#[tokio::test]
async fn test_async_failure_short_circuits() {
    let mock = Mock::new("Repository");
    let repo = MockRepository::new(&mock);
    repo.fetch
        .when()
        .always_fail(InvocationFailure::new("connection reset"));

    let err = copy_record(&repo, 1, 2).await.unwrap_err();
    assert_eq!(err.to_string(), "Repository::fetch failed: connection reset");

    assert!(stand_in::verify(repo.fetch.calls().once()).passed());
    assert!(stand_in::verify(repo.store.calls().never()).passed());
}

#[tokio::test]
async fn test_handles_move_into_spawned_tasks() {
    let mock = Mock::new("Repository");
    let repo = MockRepository::new(&mock);
    let store = repo.store.clone();

    tokio::spawn(async move {
        for id in 0..3 {
            store.invoke((id, format!("value-{}", id)));
        }
    })
    .await
    .unwrap();

    assert_eq!(repo.store.call_count(), 3);
    assert!(stand_in::verify(repo.store.calls() * 3).passed());
}
