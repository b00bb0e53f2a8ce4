//! End-to-end drop zone scenarios against the in-memory platform.
//!
//! Each test binds a real controller, drives it with platform events and
//! virtual time, and checks the notifications collected on the container.

#[cfg(test)]
mod scenario_tests {
    use std::rc::Rc;
    use std::time::Duration;

    use crate::platform::memory::{MemoryEvent, MemoryFile, MemoryPlatform, NodeId};
    use crate::{
        Capabilities, DISABLED_CLASS, DropMethod, EventKind, FileDrop, InvalidTarget, ListenTarget,
        Options, Payload, Platform,
    };

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn files(count: usize) -> Vec<MemoryFile> {
        (0..count)
            .map(|i| MemoryFile::new(format!("file-{i}.png"), "image/png").with_size(1024))
            .collect()
    }

    fn bind_with(
        platform: &MemoryPlatform,
        options: Options<NodeId>,
    ) -> (NodeId, FileDrop<MemoryPlatform>) {
        init_logging();
        let container = platform.create_element("div");
        platform.append_child(&platform.body(), &container);
        let zone = FileDrop::bind(platform.clone(), container, options).unwrap();
        (container, zone)
    }

    fn bind(options: Options<NodeId>) -> (MemoryPlatform, NodeId, FileDrop<MemoryPlatform>) {
        let platform = MemoryPlatform::new();
        let (container, zone) = bind_with(&platform, options);
        (platform, container, zone)
    }

    fn picker_of(zone: &FileDrop<MemoryPlatform>) -> NodeId {
        *zone.picker().element()
    }

    const ALL_LISTENERS: usize = 13;

    #[test]
    fn test_drop_two_files_on_container() {
        let (platform, container, _zone) = bind(Options::default());

        let drop = platform.drop_files(container, files(2));
        assert!(drop.default_prevented());

        let dispatched = platform.take_dispatched();
        assert_eq!(dispatched.len(), 1, "document handler must leave container drops alone");
        assert_eq!(dispatched[0].target, container);

        let notification = &dispatched[0].notification;
        assert_eq!(notification.name(), "filedrop");
        assert_eq!(notification.method(), Some(DropMethod::Drop));
        assert_eq!(notification.files().len(), 2);
        assert!(notification.event().is_some_and(|event| event.same_event(&drop)));
        assert!(!notification.is_dragging_files());
    }

    #[test]
    fn test_drop_on_container_descendant() {
        let (platform, container, _zone) = bind(Options::default());
        let caption = platform.create_element("span");
        platform.append_child(&container, &caption);

        let drop = platform.drop_files(caption, files(1));
        assert!(drop.default_prevented());

        let dispatched = platform.take_dispatched();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].target, container);
        assert_eq!(dispatched[0].notification.name(), "filedrop");
        assert_eq!(dispatched[0].notification.files().len(), 1);
    }

    #[test]
    fn test_single_file_limit_selection() {
        let (platform, _container, zone) = bind(Options::default().with_file_limit(1));
        let picker = picker_of(&zone);
        assert!(!platform.is_multiple(picker));

        platform.choose_files(picker, files(1));

        let notifications = platform.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].name(), "filedrop");
        assert_eq!(notifications[0].method(), Some(DropMethod::Input));
        assert_eq!(notifications[0].files().len(), 1);
        assert_eq!(notifications[0].options.multiple, Some(false));
    }

    #[test]
    fn test_dialog_cancel_after_poll_budget() {
        let (platform, container, zone) = bind(Options::default());
        let picker = picker_of(&zone);

        platform.click(&container);
        assert_eq!(platform.dialog_requests(picker), 1);
        assert_eq!(platform.notification_names(), vec!["filedialogopen"]);
        assert!(zone.is_file_dialog_open());

        platform.focus_window();
        assert!(!zone.is_file_dialog_open());

        platform.advance(Duration::from_millis(35 * 20));
        assert_eq!(platform.notification_names(), vec!["filedialogopen"]);

        platform.advance(Duration::from_millis(35));
        assert_eq!(
            platform.notification_names(),
            vec!["filedialogopen", "filedialogcancel"]
        );

        platform.advance(Duration::from_secs(2));
        assert_eq!(platform.take_notifications().len(), 2);
    }

    #[test]
    fn test_dialog_close_when_files_appear() {
        let (platform, container, zone) = bind(Options::default());
        let picker = picker_of(&zone);

        platform.click(&container);
        platform.focus_window();
        platform.advance(Duration::from_millis(10));
        platform.set_files(picker, files(1));
        platform.advance(Duration::from_millis(25));

        assert_eq!(
            platform.notification_names(),
            vec!["filedialogopen", "filedialogclose"]
        );
        platform.advance(Duration::from_secs(2));
        assert_eq!(
            platform.notification_names(),
            vec!["filedialogopen", "filedialogclose"]
        );
    }

    #[test]
    fn test_focus_without_open_dialog_does_nothing() {
        let (platform, _container, _zone) = bind(Options::default());

        platform.focus_window();
        platform.advance(Duration::from_secs(1));
        assert!(platform.take_notifications().is_empty());
    }

    #[test]
    fn test_non_file_drags_are_ignored() {
        let (platform, container, zone) = bind(Options::default());
        let outside = platform.create_element("aside");
        platform.append_child(&platform.body(), &outside);

        for target in [container, outside] {
            for kind in [
                EventKind::DragEnter,
                EventKind::DragOver,
                EventKind::DragLeave,
                EventKind::Drop,
            ] {
                let event = platform.drag(kind, target, Vec::new());
                assert!(!event.default_prevented(), "{kind:?} on {target:?}");
                assert!(!zone.is_dragging_files());
            }
        }
        assert!(platform.take_notifications().is_empty());
        assert!(zone.trigger_event().is_none());
    }

    #[test]
    fn test_container_drag_sequence() {
        let (platform, container, zone) = bind(Options::default().with_id("uploads"));

        platform.drag(EventKind::DragEnter, container, files(3));
        assert!(zone.is_dragging_files());
        platform.drag(EventKind::DragOver, container, files(3));
        platform.drag(EventKind::DragLeave, container, files(3));

        let notifications = platform.take_notifications();
        let names: Vec<_> = notifications.iter().map(|n| n.name()).collect();
        assert_eq!(
            names,
            vec![
                "filedragenter",
                "filedragover",
                "windowfiledragover",
                "filedragleave",
                "windowfiledragleave",
            ]
        );
        assert!(notifications.iter().all(|n| n.files().len() == 3));
        assert!(notifications.iter().all(|n| n.id.as_deref() == Some("uploads")));
        assert!(notifications[0].is_dragging_files());
        // The document leave ran last and ended the drag
        assert!(!notifications[4].is_dragging_files());
        assert!(!zone.is_dragging_files());
    }

    #[test]
    fn test_window_drop_elsewhere() {
        let (platform, _container, _zone) = bind(Options::default());
        let sidebar = platform.create_element("nav");
        platform.append_child(&platform.body(), &sidebar);

        let drop = platform.drop_files(sidebar, files(1));
        assert!(drop.default_prevented());

        let notifications = platform.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].name(), "filedrop");
        assert_eq!(notifications[0].method(), Some(DropMethod::Drop));
    }

    #[test]
    fn test_window_drop_disabled() {
        let (platform, container, _zone) = bind(Options::default().with_window_drop(false));
        let sidebar = platform.create_element("nav");
        platform.append_child(&platform.body(), &sidebar);

        let drop = platform.drop_files(sidebar, files(1));
        assert!(drop.default_prevented());
        assert!(platform.take_notifications().is_empty());

        // Drops on the container itself are unaffected
        platform.drop_files(container, files(1));
        assert_eq!(platform.notification_names(), vec!["filedrop"]);
    }

    #[test]
    fn test_disable_removes_all_listeners() {
        let (platform, container, zone) = bind(Options::default());
        let picker = picker_of(&zone);
        assert_eq!(platform.listener_count(), ALL_LISTENERS);

        zone.update(Options::default().with_disabled(true));
        assert_eq!(platform.listener_count(), 0);
        assert!(platform.has_class(container, DISABLED_CLASS));
        assert!(!zone.is_bound());

        platform.drag(EventKind::DragEnter, container, files(1));
        platform.drop_files(container, files(1));
        platform.click(&container);
        platform.press_key(container, "Enter");
        assert!(platform.take_notifications().is_empty());
        assert_eq!(platform.dialog_requests(picker), 0);

        zone.update(Options::default());
        assert!(!platform.has_class(container, DISABLED_CLASS));
        assert_eq!(platform.listener_count(), ALL_LISTENERS);
    }

    #[test]
    fn test_disable_forgets_open_dialog() {
        let (platform, container, zone) = bind(Options::default());
        platform.click(&container);
        assert!(zone.is_file_dialog_open());

        zone.update(Options::default().with_disabled(true));
        assert!(!zone.is_file_dialog_open());
        assert!(zone.trigger_event().is_none());

        // The dialog closes while nobody listens
        platform.focus_window();
        platform.advance(Duration::from_secs(2));

        zone.update(Options::default());
        assert!(!zone.is_file_dialog_open());
        platform.focus_window();
        platform.advance(Duration::from_secs(2));
        assert_eq!(platform.notification_names(), vec!["filedialogopen"]);
    }

    #[test]
    fn test_disable_forgets_live_drag() {
        let (platform, container, zone) = bind(Options::default());
        platform.drag(EventKind::DragEnter, container, files(1));
        assert!(zone.is_dragging_files());

        zone.update(Options::default().with_disabled(true));
        assert!(!zone.is_dragging_files());
        zone.update(Options::default());
        platform.take_notifications();

        platform.click(&container);
        let notifications = platform.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].name(), "filedialogopen");
        assert!(!notifications[0].is_dragging_files());
    }

    #[test]
    fn test_zero_file_limit_binds_disabled() {
        let (platform, container, zone) = bind(Options::default().with_file_limit(0));
        assert_eq!(platform.listener_count(), 0);
        assert!(platform.has_class(container, DISABLED_CLASS));
        assert!(zone.options().is_disabled());
    }

    #[test]
    fn test_repeated_update_is_idempotent() {
        let (platform, container, zone) = bind(Options::default());

        for _ in 0..3 {
            zone.update(Options::default());
        }
        assert_eq!(platform.listener_count(), ALL_LISTENERS);

        platform.drop_files(container, files(1));
        assert_eq!(platform.notification_names(), vec!["filedrop"]);
    }

    #[test]
    fn test_keyboard_activation() {
        let (platform, container, zone) = bind(Options::default());
        let picker = picker_of(&zone);

        let tab = platform.press_key(container, "Tab");
        assert!(!tab.default_prevented());
        assert_eq!(platform.dialog_requests(picker), 0);
        assert!(zone.trigger_event().is_some_and(|event| event.same_event(&tab)));

        let enter = platform.press_key(container, "Enter");
        assert!(enter.default_prevented());
        platform.press_key(container, " ");
        assert_eq!(platform.dialog_requests(picker), 2);
        assert_eq!(
            platform.notification_names(),
            vec!["filedialogopen", "filedialogopen"]
        );
    }

    #[test]
    fn test_click_to_upload_off() {
        let (platform, container, zone) = bind(Options::default().with_click_to_upload(false));
        let picker = picker_of(&zone);
        assert_eq!(
            platform.listener_count_on(ListenTarget::Element(&container)),
            5
        );

        platform.click(&container);
        assert_eq!(platform.dialog_requests(picker), 0);

        platform.press_key(container, "Enter");
        assert_eq!(platform.dialog_requests(picker), 1);

        zone.update(Options::default());
        platform.click(&container);
        assert_eq!(platform.dialog_requests(picker), 2);
    }

    #[test]
    fn test_picker_selection_reports_trigger_event() {
        let (platform, container, zone) = bind(Options::default());
        let picker = picker_of(&zone);

        let click = platform.fire(MemoryEvent::click(container));
        platform.choose_files(picker, files(2));

        let notifications = platform.take_notifications();
        let drop = notifications.last().unwrap();
        assert_eq!(drop.method(), Some(DropMethod::Input));
        assert!(drop.event().is_some_and(|event| event.same_event(&click)));
        assert!(drop.is_file_dialog_open());
    }

    #[test]
    fn test_picker_selection_ignores_flags() {
        let (platform, container, zone) = bind(Options::default());
        let picker = picker_of(&zone);

        platform.click(&container);
        platform.drag(EventKind::DragEnter, container, files(1));
        assert!(zone.is_dragging_files());
        assert!(zone.is_file_dialog_open());
        platform.take_notifications();

        platform.choose_files(picker, files(4));
        let notifications = platform.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].method(), Some(DropMethod::Input));
        assert_eq!(notifications[0].files().len(), 4);
    }

    #[test]
    fn test_headless_skips_global_listeners() {
        let platform = MemoryPlatform::headless();
        let (container, zone) = bind_with(&platform, Options::default());

        assert_eq!(platform.listener_count(), 8);
        assert_eq!(platform.listener_count_on(ListenTarget::Document), 0);
        assert_eq!(platform.listener_count_on(ListenTarget::Window), 0);

        platform.drop_files(container, files(1));
        assert_eq!(platform.notification_names(), vec!["filedrop"]);
        drop(zone);
    }

    #[test]
    fn test_deferred_dialog_open() {
        let platform = MemoryPlatform::with_capabilities(Capabilities {
            browser: true,
            deferred_dialog_open: true,
        });
        let (container, zone) = bind_with(&platform, Options::default());
        let picker = picker_of(&zone);

        platform.click(&container);
        assert_eq!(platform.dialog_requests(picker), 0);

        platform.advance(Duration::from_millis(1));
        assert_eq!(platform.dialog_requests(picker), 1);
        assert_eq!(platform.notification_names(), vec!["filedialogopen"]);
    }

    #[test]
    fn test_destroy_cancels_dialog_poll() {
        let (platform, container, zone) = bind(Options::default());

        platform.click(&container);
        platform.focus_window();
        zone.destroy();
        platform.advance(Duration::from_secs(2));

        assert_eq!(platform.notification_names(), vec!["filedialogopen"]);
    }

    #[test]
    fn test_new_poll_replaces_running_one() {
        let (platform, container, _zone) = bind(Options::default());

        platform.click(&container);
        platform.focus_window();
        platform.advance(Duration::from_millis(100));
        platform.click(&container);
        platform.focus_window();
        platform.advance(Duration::from_secs(2));

        assert_eq!(
            platform.notification_names(),
            vec!["filedialogopen", "filedialogopen", "filedialogcancel"]
        );
    }

    #[test]
    fn test_destroy_twice_and_synthesized_picker_removal() {
        let (platform, container, zone) = bind(Options::default());
        let picker = picker_of(&zone);
        assert_eq!(platform.parent(picker), Some(container));
        platform.set_files(picker, files(1));

        zone.destroy();
        zone.destroy();
        assert_eq!(platform.listener_count(), 0);
        assert_eq!(platform.parent(picker), None);
        assert!(platform.files(picker).is_empty());

        zone.update(Options::default());
        assert_eq!(platform.parent(picker), Some(container));
        assert_eq!(platform.listener_count(), ALL_LISTENERS);
    }

    #[test]
    fn test_supplied_picker_survives_destroy() {
        let platform = MemoryPlatform::new();
        let form = platform.create_element("form");
        let input = platform.create_element_with_type("input", "file");
        platform.append_child(&platform.body(), &form);
        platform.append_child(&form, &input);

        let (_container, zone) = bind_with(&platform, Options::default().with_input(input));
        assert!(platform.is_hidden(input));
        drop(zone);

        assert_eq!(platform.parent(input), Some(form));
        assert_eq!(platform.listener_count(), 0);
    }

    #[test]
    fn test_embedded_picker_lends_tab_index() {
        let platform = MemoryPlatform::new();
        let container = platform.create_element("div");
        let input = platform.create_file_input();
        platform.append_child(&platform.body(), &container);
        platform.append_child(&container, &input);

        let zone = FileDrop::bind(
            platform.clone(),
            container,
            Options::default().with_accept(vec!["image/*".to_string(), ".pdf".to_string()]),
        )
        .unwrap();

        assert_eq!(platform.tab_index(&container), 0);
        assert_eq!(platform.tab_index(&input), -1);
        assert_eq!(platform.accept(input).as_deref(), Some("image/*,.pdf"));
        assert_eq!(platform.autocomplete(input).as_deref(), Some("off"));
        assert!(platform.is_multiple(input));
        assert_eq!(zone.picker(), &crate::Picker::Embedded(input));
    }

    #[test]
    fn test_bind_rejects_invalid_targets() {
        let platform = MemoryPlatform::new();
        let input = platform.create_file_input();
        assert!(matches!(
            FileDrop::bind(platform.clone(), input, Options::default()),
            Err(InvalidTarget::ContainerIsInput)
        ));

        let container = platform.create_element("div");
        let checkbox = platform.create_element_with_type("input", "checkbox");
        assert!(matches!(
            FileDrop::bind(platform.clone(), container, Options::default().with_input(checkbox)),
            Err(InvalidTarget::PickerNotFileInput)
        ));
        assert_eq!(platform.listener_count(), 0);
    }

    #[test]
    fn test_teardown_during_extraction_drops_notification() {
        let platform = MemoryPlatform::new();
        let (container, zone) = bind_with(&platform, Options::default());
        let zone = Rc::new(zone);

        // Runs on the document after the container handler spawned extraction
        let disabler = zone.clone();
        platform.listen(
            ListenTarget::Document,
            EventKind::Drop,
            Rc::new(move |_: MemoryEvent| disabler.update(Options::default().with_disabled(true))),
        );

        platform.drop_files(container, files(2));
        assert!(platform.take_notifications().is_empty());
    }

    #[test]
    fn test_notification_carries_resolved_options() {
        let (platform, container, _zone) = bind(
            Options::default()
                .with_id("avatar")
                .with_file_limit(3)
                .with_accept("image/*"),
        );

        platform.drop_files(container, files(1));
        let notifications = platform.take_notifications();
        let notification = &notifications[0];
        assert_eq!(notification.id.as_deref(), Some("avatar"));
        assert!(notification.options.is_multiple());
        assert_eq!(notification.options.file_limit, Some(3));
        match &notification.payload {
            Payload::Files { files, .. } => assert_eq!(files[0].mime, "image/png"),
            Payload::Dialog(notice) => panic!("unexpected dialog notice {notice:?}"),
        }
    }
}
