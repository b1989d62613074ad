use super::*;

#[test]
fn navigator_starts_at_initial_path() {
    let nav = Navigator::new("/citizen/dashboard");
    assert_eq!(nav.current(), "/citizen/dashboard");
}

#[test]
fn navigator_default_is_home() {
    assert_eq!(Navigator::default().current(), HOME_PATH);
}

#[test]
fn clones_share_location() {
    let nav = Navigator::default();
    let other = nav.clone();
    other.navigate(LOGIN_PATH);
    assert_eq!(nav.current(), LOGIN_PATH);
}

#[tokio::test]
async fn subscribers_see_repeated_navigation() {
    let nav = Navigator::new(LOGIN_PATH);
    let mut rx = nav.subscribe();
    nav.navigate(LOGIN_PATH);
    assert!(rx.has_changed().unwrap());
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow(), LOGIN_PATH);
}
