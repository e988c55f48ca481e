//! Profile demo binary
//!
//! Walks the full update lifecycle of the livestate container: a
//! successful update, a rejected update with a retry, and teardown.

use livestate_core::action::Action;
use livestate_runtime::Gateway;
use profile::{ProfileContainer, SimulatedProfileApi, User, UserForm, update_user};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile=debug,livestate_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Profile Example: livestate container ===\n");

    let user = User::new("alice", "still learning", "likes rust");
    let container = ProfileContainer::new(user.clone());
    let api = Arc::new(SimulatedProfileApi::new(user.clone()));
    let gateway = Gateway::new(&container, Arc::clone(&api));

    let subscription = container.subscribe(|snapshot| {
        println!(
            "  [subscriber] status={} tagline={:?} error={:?}",
            snapshot.status(),
            snapshot.data().tagline,
            snapshot.error().map(ToString::to_string),
        );
    });

    println!("Initial: {:?}\n", container.state(|s| s.data().clone()));

    // A successful update
    println!(">>> Updating tagline");
    let mut form = UserForm::prefilled(&user);
    form.tagline = "shipping".to_string();
    if let Err(error) = update_user(&gateway, &user, &form).await {
        eprintln!("update rejected: {error}");
    }
    let confirmed = container.state(|s| s.data().clone());
    println!("Confirmed: {confirmed:?}\n");

    // Start a fresh cycle, then try the forbidden marker
    println!(">>> Resetting, then submitting the 'fail' marker");
    if let Err(error) = container.dispatch(Action::Reset {
        baseline: confirmed.clone(),
    }) {
        eprintln!("reset rejected: {error}");
    }
    let mut form = UserForm::prefilled(&confirmed);
    form.bio = "fail".to_string();
    if let Err(error) = update_user(&gateway, &confirmed, &form).await {
        eprintln!("update rejected: {error}");
    }
    println!(
        "Rejected with: {:?}\n",
        container.state(|s| s.error().map(ToString::to_string))
    );

    // Retry with an acceptable bio; rejected -> pending is legal
    println!(">>> Retrying with a valid bio");
    let mut form = UserForm::prefilled(&confirmed);
    form.bio = "writes reducers".to_string();
    if let Err(error) = update_user(&gateway, &confirmed, &form).await {
        eprintln!("update rejected: {error}");
    }
    println!("Confirmed: {:?}\n", container.state(|s| s.data().clone()));

    subscription.unsubscribe();
    container.teardown();
    println!("Torn down; backend saw {} calls.", api.calls());
}
