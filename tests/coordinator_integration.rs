//! Integration tests for the presentation coordinator
//!
//! The coordinator is wired to recording fakes; each test drives it the way
//! the shell does and checks the derived view state and collaborator calls.

mod common;

use std::path::{Path, PathBuf};
use std::time::Duration;

use acqview::error::AcqViewError;
use acqview::events::{ChangeEvent, DataEvent, LifecycleEvent};
use acqview::frontend::coordinator::{CloseDecision, RUNTIME_REFRESH};
use acqview::frontend::dispatch::FileKind;
use acqview::frontend::menus::MenuCommand;
use acqview::frontend::phase_view::UiAction;
use acqview::types::{Phase, XAxisMode, YAxisMode};
use common::builders::ModelsBuilder;
use common::mock_helpers::Harness;
use common::EventRecorder;

// ==================== Acquisition ====================

#[test]
fn test_start_rejected_without_active_channels() {
    let (models, _) = ModelsBuilder::new().channels(2).inactive(0).inactive(1).build();
    let h = Harness::new(models);

    let result = h.coordinator.start_acquisition();

    assert!(matches!(result, Err(AcqViewError::NoActiveChannels)));
    assert_eq!(h.models.lifecycle.phase(), Phase::Idle);
    assert!(h.transport.starts.borrow().is_empty());
    assert_eq!(h.scheduler.count(), 0);
}

#[test]
fn test_start_polls_active_channels_and_clears_data() {
    let (models, ids) = ModelsBuilder::new().channels(3).inactive(1).build();
    let h = Harness::new(models);
    let (recorder, _) = EventRecorder::attach(&h.models.bus);
    h.models.lifecycle.set_y_axis_mode(YAxisMode::Manual);
    h.models.lifecycle.set_x_axis_mode(XAxisMode::Manual);

    h.coordinator.start_acquisition().unwrap();

    assert_eq!(h.models.lifecycle.phase(), Phase::Running);
    assert_eq!(*h.transport.starts.borrow(), vec![vec![ids[0], ids[2]]]);
    assert_eq!(h.data_files.rewrites.get(), 1);
    assert_eq!(recorder.count(|e| *e == ChangeEvent::Data(DataEvent::Cleared)), 1);
    assert_eq!(h.models.lifecycle.y_axis_mode(), YAxisMode::Auto);
    assert_eq!(h.models.lifecycle.x_axis_mode(), XAxisMode::Auto);

    let status = h.coordinator.status();
    assert_eq!(status.state, "Running");
    assert!(status.runtime.visible);
    assert!(h.coordinator.is_enabled(UiAction::Stop));
    assert!(!h.coordinator.is_enabled(UiAction::Start));
    assert!(!h.coordinator.is_enabled(UiAction::ImportDataFile));
}

#[test]
fn test_refused_transport_start_keeps_old_data() {
    let (models, _) = ModelsBuilder::new().channels(1).build();
    let h = Harness::new(models);
    h.transport.accept.set(false);

    h.coordinator.start_acquisition().unwrap();

    assert_eq!(h.models.lifecycle.phase(), Phase::Running);
    assert_eq!(h.data_files.rewrites.get(), 0);
}

#[test]
fn test_stop_requires_running() {
    let (models, _) = ModelsBuilder::new().channels(1).build();
    let h = Harness::new(models);

    assert!(matches!(
        h.coordinator.stop_acquisition(),
        Err(AcqViewError::IllegalTransition { from: Phase::Idle, .. })
    ));

    h.coordinator.start_acquisition().unwrap();
    h.coordinator.stop_acquisition().unwrap();

    assert_eq!(h.transport.stops.get(), 1);
    assert!(!h.transport.active.get());
    assert_eq!(h.models.lifecycle.phase(), Phase::Stopped);
    assert!(h.coordinator.is_enabled(UiAction::ExportDataCsv));
}

#[test]
fn test_start_from_loaded_data_discards_it_first() {
    let (models, _) = ModelsBuilder::new()
        .channels(2)
        .data_loaded("/data/log.csv")
        .build();
    let h = Harness::new(models);

    // Discarding empties the registry, leaving nothing to acquire
    let result = h.coordinator.start_acquisition();

    assert!(matches!(result, Err(AcqViewError::NoActiveChannels)));
    assert_eq!(h.models.lifecycle.phase(), Phase::Idle);
    assert!(h.models.channels.is_empty());
    assert_eq!(h.models.lifecycle.data_file_path(), None);
}

// ==================== Runtime and statistics ====================

#[test]
fn test_runtime_tick_renders_and_rearms_while_running() {
    let (models, _) = ModelsBuilder::new().channels(1).build();
    let h = Harness::new(models);
    let (recorder, _) = EventRecorder::attach(&h.models.bus);

    h.coordinator.start_acquisition().unwrap();
    assert_eq!(*h.scheduler.scheduled.borrow(), vec![RUNTIME_REFRESH]);
    assert_eq!(
        h.coordinator.status().runtime.text,
        "Runtime: 0 hours, 0 minutes 0 seconds"
    );

    h.clock.advance(Duration::from_secs(3_725));
    h.coordinator.on_runtime_tick();

    assert_eq!(
        h.coordinator.status().runtime.text,
        "Runtime: 1 hours, 2 minutes 5 seconds"
    );
    assert_eq!(h.scheduler.count(), 2);
    assert!(recorder
        .events()
        .contains(&ChangeEvent::RuntimeTick(Duration::from_secs(3_725))));

    // The tick after stopping still renders but does not re-arm
    h.coordinator.stop_acquisition().unwrap();
    h.clock.advance(Duration::from_secs(1));
    h.coordinator.on_runtime_tick();
    assert_eq!(h.scheduler.count(), 2);
    assert_eq!(
        h.coordinator.status().runtime.text,
        "Runtime: 1 hours, 2 minutes 6 seconds"
    );
}

#[test]
fn test_stats_follow_counters() {
    let (models, _) = ModelsBuilder::new().channels(2).build();
    let h = Harness::new(models);
    h.coordinator.start_acquisition().unwrap();

    h.models.lifecycle.record_results(7, 2).unwrap();
    assert_eq!(h.coordinator.status().stats.text, "Success: 7\tErrors: 2");

    // Stopped keeps the last values
    h.coordinator.stop_acquisition().unwrap();
    let status = h.coordinator.status();
    assert!(status.stats.visible);
    assert_eq!(status.stats.text, "Success: 7\tErrors: 2");

    // A restart resets the counters through clear_data
    h.coordinator.start_acquisition().unwrap();
    assert_eq!(h.coordinator.status().stats.text, "Success: 0\tErrors: 0");
}

#[test]
fn test_data_loaded_hides_runtime_and_stats() {
    let (models, _) = ModelsBuilder::new()
        .channels(1)
        .data_loaded("/data/log.csv")
        .build();
    let h = Harness::new(models);

    let status = h.coordinator.status();
    assert_eq!(status.state, "Data File loaded");
    assert!(!status.runtime.visible);
    assert!(!status.stats.visible);
    assert!(status.stats.text.is_empty());

    // Hidden fields are not rendered by ticks
    h.coordinator.on_runtime_tick();
    assert!(h.coordinator.status().runtime.text.is_empty());
}

// ==================== Menus ====================

#[test]
fn test_menus_list_active_channels_by_position() {
    let (models, ids) = ModelsBuilder::new()
        .channels(3)
        .label(0, "Pressure")
        .label(2, "Flow")
        .inactive(1)
        .build();
    let h = Harness::new(models);

    let menus = h.coordinator.menus();
    let labels: Vec<_> = menus.show_hide.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Pressure", "Flow"]);
    assert_eq!(menus.show_hide.entries[1].channel, ids[2]);
    assert_eq!(menus.show_hide.entries[1].position, 1);
    assert!(menus.show_hide.enabled);
    assert!(menus.bring_to_front.enabled);

    h.models.channels.set_active(ids[1], true).unwrap();
    assert_eq!(h.coordinator.menus().show_hide.entries.len(), 3);

    h.models.channels.remove(ids[0]).unwrap();
    let menus = h.coordinator.menus();
    assert_eq!(menus.show_hide.entries[0].channel, ids[1]);
}

#[test]
fn test_hiding_every_channel_disables_bring_to_front() {
    let (models, ids) = ModelsBuilder::new().channels(2).build();
    let h = Harness::new(models);

    assert!(h
        .coordinator
        .apply_menu_command(MenuCommand::ToggleShowHide { position: 0, visible: false })
        .unwrap());
    let menus = h.coordinator.menus();
    assert!(!menus.show_hide.entries[0].checked);
    assert!(!menus.bring_to_front.entries[0].visible);
    assert!(menus.bring_to_front.enabled);

    h.models.channels.set_visible(ids[1], false).unwrap();
    assert!(!h.coordinator.menus().bring_to_front.enabled);

    h.models.channels.set_visible(ids[0], true).unwrap();
    assert!(h.coordinator.menus().bring_to_front.enabled);
}

#[test]
fn test_label_change_refreshes_entry_in_place() {
    let (models, ids) = ModelsBuilder::new().channels(2).build();
    let h = Harness::new(models);

    h.models.channels.set_label(ids[1], "Temperature").unwrap();

    let menus = h.coordinator.menus();
    assert_eq!(menus.show_hide.entries[1].label, "Temperature");
    assert_eq!(menus.bring_to_front.entries[1].label, "Temperature");
}

#[test]
fn test_bring_to_front_selects_single_entry() {
    let (models, _) = ModelsBuilder::new().channels(3).build();
    let h = Harness::new(models);

    assert!(h
        .coordinator
        .apply_menu_command(MenuCommand::BringToFront { position: 2 })
        .unwrap());
    assert_eq!(h.models.lifecycle.front_channel(), Some(2));

    let checked: Vec<_> = h
        .coordinator
        .menus()
        .bring_to_front
        .entries
        .iter()
        .map(|e| e.checked)
        .collect();
    assert_eq!(checked, vec![false, false, true]);
}

fn checked_front_entries(h: &Harness) -> Vec<acqview::types::ChannelId> {
    h.coordinator
        .menus()
        .bring_to_front
        .entries
        .iter()
        .filter(|e| e.checked)
        .map(|e| e.channel)
        .collect()
}

#[test]
fn test_front_channel_follows_its_channel_when_earlier_one_goes() {
    let (models, ids) = ModelsBuilder::new().channels(3).build();
    let h = Harness::new(models);
    h.models.lifecycle.set_front_channel(Some(1));
    assert_eq!(checked_front_entries(&h), vec![ids[1]]);

    h.models.channels.remove(ids[0]).unwrap();

    assert_eq!(h.models.lifecycle.front_channel(), Some(0));
    assert_eq!(checked_front_entries(&h), vec![ids[1]]);

    // Deactivating an earlier channel shifts the position the same way
    let added = h.models.channels.add();
    h.coordinator
        .apply_menu_command(MenuCommand::BringToFront { position: 2 })
        .unwrap();
    h.models.channels.set_active(ids[1], false).unwrap();

    assert_eq!(h.models.lifecycle.front_channel(), Some(1));
    assert_eq!(checked_front_entries(&h), vec![added]);
}

#[test]
fn test_front_channel_cleared_when_it_leaves_active_set() {
    let (models, ids) = ModelsBuilder::new().channels(3).build();
    let h = Harness::new(models);
    h.models.lifecycle.set_front_channel(Some(2));

    h.models.channels.set_active(ids[2], false).unwrap();

    assert_eq!(h.models.lifecycle.front_channel(), None);
    assert!(checked_front_entries(&h).is_empty());

    h.models.channels.set_active(ids[2], true).unwrap();
    assert_eq!(h.models.lifecycle.front_channel(), None);
}

#[test]
fn test_stale_menu_commands_are_ignored() {
    let (models, _) = ModelsBuilder::new().channels(1).build();
    let h = Harness::new(models);
    let (recorder, _) = EventRecorder::attach(&h.models.bus);

    assert!(!h
        .coordinator
        .apply_menu_command(MenuCommand::ToggleShowHide { position: 4, visible: false })
        .unwrap());
    assert!(!h
        .coordinator
        .apply_menu_command(MenuCommand::BringToFront { position: 1 })
        .unwrap());
    assert!(recorder.is_empty());
}

#[test]
fn test_context_menu_hidden_while_cursor_active() {
    let (models, _) = ModelsBuilder::new().channels(2).build();
    let h = Harness::new(models);

    assert!(h.coordinator.context_menu().is_some());
    h.coordinator.on_modifier_changed(true);
    assert!(h.models.lifecycle.cursor_active());
    assert!(h.coordinator.context_menu().is_none());

    h.coordinator.on_focus_lost();
    let menu = h.coordinator.context_menu().unwrap();
    assert_eq!(menu.show_hide.entries.len(), 2);
    assert!(!menu.highlight_samples);
}

// ==================== Files ====================

#[test]
fn test_dispatch_routes_by_suffix() {
    let (models, _) = ModelsBuilder::new().channels(1).build();
    let h = Harness::new(models);

    let kind = h.coordinator.dispatch_file(Path::new("/data/run.CSV")).unwrap();
    assert_eq!(kind, Some(FileKind::DataFile));
    assert_eq!(*h.data_files.loaded.borrow(), vec![PathBuf::from("/data/run.CSV")]);
    assert_eq!(h.models.lifecycle.last_dir(), Some(PathBuf::from("/data")));

    let kind = h.coordinator.dispatch_file(Path::new("/projects/pump.mbs")).unwrap();
    assert_eq!(kind, Some(FileKind::Project));
    assert_eq!(h.project_files.loaded.borrow().len(), 1);

    let kind = h.coordinator.dispatch_file(Path::new("/data/notes.unknown")).unwrap();
    assert_eq!(kind, None);
    assert_eq!(h.data_files.loaded.borrow().len(), 1);
    assert_eq!(h.project_files.loaded.borrow().len(), 1);
}

#[test]
fn test_dispatch_refused_while_running() {
    let (models, _) = ModelsBuilder::new().channels(1).build();
    let h = Harness::new(models);
    h.coordinator.start_acquisition().unwrap();

    let result = h.coordinator.dispatch_file(Path::new("/data/run.csv"));

    assert!(matches!(result, Err(AcqViewError::AcquisitionActive)));
    assert!(h.data_files.loaded.borrow().is_empty());
    assert_eq!(h.models.lifecycle.last_dir(), None);
}

#[test]
fn test_drop_while_running_is_ignored_silently() {
    let (models, _) = ModelsBuilder::new().channels(1).build();
    let h = Harness::new(models);
    h.coordinator.start_acquisition().unwrap();

    let dropped = vec![PathBuf::from("/data/run.csv")];
    let kind = h.coordinator.dispatch_dropped(&dropped).unwrap();

    assert_eq!(kind, None);
    assert!(h.data_files.loaded.borrow().is_empty());
    assert_eq!(h.models.lifecycle.last_dir(), None);
    assert_eq!(h.models.lifecycle.phase(), Phase::Running);
}

#[test]
fn test_dispatch_dropped_uses_last_path() {
    let (models, _) = ModelsBuilder::new().build();
    let h = Harness::new(models);

    let dropped = vec![PathBuf::from("/a/first.mbs"), PathBuf::from("/b/second.csv")];
    let kind = h.coordinator.dispatch_dropped(&dropped).unwrap();

    assert_eq!(kind, Some(FileKind::DataFile));
    assert!(h.project_files.loaded.borrow().is_empty());
    assert_eq!(h.coordinator.dispatch_dropped(&[]).unwrap(), None);
}

#[test]
fn test_register_definitions_ask_before_discarding() {
    let (models, _) = ModelsBuilder::new()
        .channels(2)
        .data_loaded("/data/log.csv")
        .build();
    let h = Harness::new(models);
    h.dialogs.confirm_discard.set(false);

    let kind = h.coordinator.dispatch_file(Path::new("/regs/pump.mbc")).unwrap();

    assert_eq!(kind, Some(FileKind::RegisterDefinitions));
    assert_eq!(h.dialogs.confirmations.get(), 1);
    assert!(h.dialogs.register_requests.borrow().is_empty());
    assert_eq!(h.models.lifecycle.phase(), Phase::DataLoaded);

    h.dialogs.confirm_discard.set(true);
    h.coordinator.dispatch_file(Path::new("/regs/pump.mbc")).unwrap();

    assert_eq!(
        *h.dialogs.register_requests.borrow(),
        vec![Some(PathBuf::from("/regs/pump.mbc"))]
    );
    assert_eq!(h.models.lifecycle.phase(), Phase::Idle);
    assert!(h.models.channels.is_empty());
}

#[test]
fn test_register_dialog_without_loaded_data_opens_directly() {
    let (models, _) = ModelsBuilder::new().channels(1).build();
    let h = Harness::new(models);

    assert!(h.coordinator.open_register_dialog(None).unwrap());

    assert_eq!(h.dialogs.confirmations.get(), 0);
    assert_eq!(*h.dialogs.register_requests.borrow(), vec![None]);
}

#[test]
fn test_reload_requires_project_file() {
    let (models, _) = ModelsBuilder::new().build();
    let h = Harness::new(models);

    assert!(!h.coordinator.is_enabled(UiAction::ReloadProjectFile));
    h.coordinator.reload_project_file().unwrap();
    assert!(h.project_files.loaded.borrow().is_empty());

    h.models
        .lifecycle
        .set_project_file_path(Some(PathBuf::from("/projects/pump.mbs")));
    assert!(h.coordinator.is_enabled(UiAction::ReloadProjectFile));
    h.coordinator.reload_project_file().unwrap();
    assert_eq!(
        *h.project_files.loaded.borrow(),
        vec![PathBuf::from("/projects/pump.mbs")]
    );
}

#[test]
fn test_window_title_follows_file_paths() {
    let (models, _) = ModelsBuilder::new().build();
    let h = Harness::new(models);
    let lifecycle = &h.models.lifecycle;
    assert_eq!(h.coordinator.window_title(), "acqview");

    lifecycle.set_project_file_path(Some(PathBuf::from("/projects/pump.mbs")));
    assert_eq!(h.coordinator.window_title(), "acqview - pump.mbs");

    lifecycle.set_data_file_path(Some(PathBuf::from("/data/log.csv")));
    assert_eq!(h.coordinator.window_title(), "acqview - log.csv");

    lifecycle.set_data_file_path(None);
    assert_eq!(h.coordinator.window_title(), "acqview - pump.mbs");
}

#[test]
fn test_returning_to_idle_forgets_data_file() {
    let (models, _) = ModelsBuilder::new()
        .channels(1)
        .data_loaded("/data/log.csv")
        .build();
    let h = Harness::new(models);
    let (recorder, _) = EventRecorder::attach(&h.models.bus);

    h.models.discard_loaded_data().unwrap();

    assert_eq!(h.models.lifecycle.data_file_path(), None);
    assert_eq!(h.coordinator.window_title(), "acqview");
    let phase = recorder
        .position(|e| matches!(e, ChangeEvent::Lifecycle(LifecycleEvent::PhaseChanged { .. })))
        .unwrap();
    let path = recorder
        .position(|e| *e == ChangeEvent::Lifecycle(LifecycleEvent::DataFilePathChanged))
        .unwrap();
    assert!(phase < path);
}

// ==================== Notes and close ====================

#[test]
fn test_close_without_note_changes_needs_no_confirmation() {
    let (models, _) = ModelsBuilder::new()
        .channels(1)
        .note(1.0, 1.0, "acquired")
        .build();
    let h = Harness::new(models);

    // Dirty notes outside DataLoaded belong to no file
    assert!(!h.coordinator.needs_close_confirmation());
    assert!(h.coordinator.resolve_close(CloseDecision::Cancel).unwrap());
}

#[test]
fn test_failed_save_aborts_close() {
    let (models, _) = ModelsBuilder::new()
        .channels(1)
        .note(1.0, 2.0, "spike")
        .data_loaded("/data/log.csv")
        .build();
    let h = Harness::new(models);
    assert!(h.coordinator.needs_close_confirmation());
    h.data_files.fail_note_writes.set(true);

    let result = h.coordinator.resolve_close(CloseDecision::Save);

    assert!(matches!(result, Err(AcqViewError::Persistence { .. })));
    assert_eq!(h.models.lifecycle.phase(), Phase::DataLoaded);
    assert!(h.models.notes.is_dirty());
    assert!(h.coordinator.needs_close_confirmation());
}

#[test]
fn test_close_decisions() {
    let (models, _) = ModelsBuilder::new()
        .channels(1)
        .note(1.0, 2.0, "spike")
        .data_loaded("/data/log.csv")
        .build();
    let h = Harness::new(models);

    assert!(!h.coordinator.resolve_close(CloseDecision::Cancel).unwrap());
    assert!(h.coordinator.resolve_close(CloseDecision::Discard).unwrap());
    assert!(h.data_files.note_writes.borrow().is_empty());

    assert!(h.coordinator.resolve_close(CloseDecision::Save).unwrap());
    assert_eq!(
        *h.data_files.note_writes.borrow(),
        vec![PathBuf::from("/data/log.csv")]
    );
    assert!(!h.models.notes.is_dirty());
    assert!(!h.coordinator.needs_close_confirmation());
}

#[test]
fn test_note_update_request_writes_data_file() {
    let (models, _) = ModelsBuilder::new()
        .channels(1)
        .data_loaded("/data/log.csv")
        .build();
    let h = Harness::new(models);

    h.coordinator.add_note("valve opened", 4.0, 1.5);
    h.models.notes.request_data_file_update();

    assert_eq!(h.data_files.note_writes.borrow().len(), 1);
    assert!(!h.models.notes.is_dirty());

    // Nothing changed since, so a second request writes nothing
    h.models.notes.request_data_file_update();
    assert_eq!(h.data_files.note_writes.borrow().len(), 1);
}

#[test]
fn test_clear_data_survives_rewrite_failure() {
    let (models, _) = ModelsBuilder::new()
        .channels(1)
        .note(1.0, 1.0, "n")
        .build();
    let h = Harness::new(models);
    h.data_files.fail_rewrites.set(true);
    h.models.lifecycle.set_markers_active(true);

    h.coordinator.clear_data();

    assert_eq!(h.data_files.rewrites.get(), 1);
    assert!(h.models.notes.is_empty());
    assert!(!h.models.lifecycle.markers_active());
}

#[test]
fn test_dropping_coordinator_unsubscribes() {
    let (models, _) = ModelsBuilder::new().channels(1).build();
    let before = models.bus.subscriber_count();
    let h = Harness::new(models.clone());
    assert_eq!(models.bus.subscriber_count(), before + 1);

    drop(h);

    assert_eq!(models.bus.subscriber_count(), before);
}
