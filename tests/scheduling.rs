use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use timetable_solver::data::{ScheduleStatus, SchedulingInput, SchedulingOutput};
use timetable_solver::solver::SolveStatus;
use timetable_solver::{SchedulerConfig, SchedulerError, solve};

const DAYS: [&str; 6] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const PERIODS: [&str; 4] = ["1st_period", "2nd_period", "3rd_period", "4th_period"];

fn config() -> SchedulerConfig {
    SchedulerConfig {
        time_limit_secs: None,
        ..SchedulerConfig::default()
    }
}

fn input(value: Value) -> SchedulingInput {
    serde_json::from_value(value).unwrap()
}

fn class(id: &str, section: &str, level: i32) -> Value {
    json!({"class_id": id, "label": id.to_uppercase(), "section": section, "level": level})
}

fn teacher(id: &str, first: &str, last: &str, gender: &str) -> Value {
    json!({"user_id": id, "first_name": first, "last_name": last, "gender": gender})
}

fn subject(id: &str, section: &str, level: i32, teachers: &[&str]) -> Value {
    json!({"subject_id": id, "name": id.to_uppercase(), "level": level, "section": section, "teacher_ids": teachers})
}

fn available_everywhere(user_id: &str) -> Value {
    let entries: Vec<Value> = DAYS
        .iter()
        .map(|d| json!({"day": d, "periods": [true, true, true, true]}))
        .collect();
    json!({"user_id": user_id, "entries": entries})
}

fn solved(input: &SchedulingInput) -> SchedulingOutput {
    let output = solve(input, &config()).unwrap();
    assert_eq!(output.status, ScheduleStatus::Ok);
    output
}

/// Checks the properties every returned timetable must satisfy.
fn assert_hard_constraints(input: &SchedulingInput, output: &SchedulingOutput) {
    let mut booked = HashSet::new();
    let mut class_slots = HashSet::new();
    for (day, period, entry) in output.timetable.entries() {
        assert!(
            booked.insert((day, period, entry.teacher_id.as_str())),
            "{} double-booked at {day} {period}",
            entry.teacher_id
        );
        assert!(
            class_slots.insert((day, period, entry.class_id.as_str())),
            "class {} has two teachers at {day} {period}",
            entry.class_id
        );

        let p = PERIODS.iter().position(|x| *x == period).unwrap();
        let available = input
            .availabilities
            .iter()
            .filter(|a| a.user_id == entry.teacher_id)
            .flat_map(|a| &a.entries)
            .any(|e| e.day == day && e.periods[p]);
        assert!(available, "{} assigned while unavailable at {day} {period}", entry.teacher_id);
    }
}

#[test]
fn scenario_a_single_available_slot_is_filled() {
    let input = input(json!({
        "classes": [class("c1", "A", 1)],
        "teachers": [teacher("t1", "Alice", "Smith", "female")],
        "subjects": [subject("maths", "A", 1, &["t1"])],
        "availabilities": [{"user_id": "t1", "entries": [{"day": "Mon", "periods": [true, false, false, false]}]}],
    }));
    let output = solved(&input);

    assert_eq!(output.filled_slots(), 1);
    assert_eq!(output.timetable.len(), 1);
    let entries = output.timetable.get("Mon", "1st_period");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].teacher_id, "t1");
    assert_eq!(entries[0].teacher_name, "Ms. Smith");
    assert_eq!(entries[0].subject_id, "maths");
    assert_eq!(entries[0].class_label, "C1");
    assert_hard_constraints(&input, &output);
}

#[test]
fn scenario_b_shared_teacher_fills_one_class_only() {
    let input = input(json!({
        "classes": [class("c1", "A", 1), class("c2", "A", 1)],
        "teachers": [teacher("t1", "Bob", "Brown", "male")],
        "subjects": [subject("maths", "A", 1, &["t1"])],
        "availabilities": [{"user_id": "t1", "entries": [{"day": "Mon", "periods": [true, false, false, false]}]}],
    }));
    let output = solved(&input);

    assert_eq!(output.filled_slots(), 1);
    let entries = output.timetable.get("Mon", "1st_period");
    assert_eq!(entries.len(), 1);
    assert!(["c1", "c2"].contains(&entries[0].class_id.as_str()));
    assert_hard_constraints(&input, &output);
}

#[test]
fn scenario_c_period_control_blacks_out_slot() {
    let input = input(json!({
        "classes": [class("c1", "A", 1)],
        "teachers": [teacher("t1", "Carol", "Jones", "female")],
        "subjects": [subject("maths", "A", 1, &["t1"])],
        "availabilities": [available_everywhere("t1")],
        "period_controls": [{"level": 1, "section": "A", "entries": [{"day": "Sat", "periods": {"4th_period": false}}]}],
    }));
    let output = solved(&input);

    assert!(output.timetable.get("Sat", "4th_period").is_empty());
    assert_eq!(output.filled_slots(), 23);
    assert_eq!(output.timetable.get("Sat", "3rd_period").len(), 1);
    assert_hard_constraints(&input, &output);
}

#[test]
fn scenario_d_missing_availability_and_unmatched_control() {
    let input = input(json!({
        "classes": [class("c1", "A", 1)],
        "teachers": [teacher("t1", "David", "Wilson", "male"), teacher("t2", "Eva", "Miller", "female")],
        "subjects": [subject("maths", "A", 1, &["t1"]), subject("physics", "A", 1, &["t2"])],
        "availabilities": [available_everywhere("t1")],
        "period_controls": [{"level": 1, "section": "B", "entries": [
            {"day": "Mon", "periods": {"1st_period": false, "2nd_period": false, "3rd_period": false, "4th_period": false}}
        ]}],
    }));
    let output = solved(&input);

    // Closed world: t2 has no availability record and is never assigned.
    assert!(output.timetable.entries().all(|(_, _, e)| e.teacher_id != "t2"));
    // Open world: the section B control does not touch class c1.
    assert_eq!(output.timetable.get("Mon", "1st_period").len(), 1);
    assert_eq!(output.filled_slots(), 24);
    assert!(output
        .timetable
        .entries()
        .all(|(_, _, e)| e.subject_id == "maths" && e.teacher_name == "Mr. Wilson"));
}

#[test]
fn class_without_eligible_teachers_stays_empty() {
    let input = input(json!({
        "classes": [class("c1", "A", 1), class("c2", "B", 2)],
        "teachers": [teacher("t1", "Frank", "Moore", "other")],
        "subjects": [subject("maths", "A", 1, &["t1"])],
        "availabilities": [available_everywhere("t1")],
    }));
    let output = solved(&input);

    assert!(output.timetable.entries().all(|(_, _, e)| e.class_id == "c1"));
    assert_eq!(output.filled_slots(), 24);
    let summary = output.summary.as_ref().unwrap();
    assert_eq!(summary.total_slots, 48);
    assert_eq!(summary.solver_status, SolveStatus::Optimal);
    assert_eq!(output.timetable.get("Mon", "1st_period")[0].teacher_name, "Frank Moore");
}

#[test]
fn specialized_level_matches_field_of_study() {
    let input = input(json!({
        "classes": [
            {"class_id": "sci", "section": "C", "level": 3, "field_of_study": "Science"},
            {"class_id": "lit", "section": "C", "level": 3, "field_of_study": "Literature"}
        ],
        "teachers": [teacher("t1", "Grace", "Taylor", "female"), teacher("t2", "Henry", "Anderson", "male")],
        "subjects": [
            {"subject_id": "bio", "name": "Biology", "level": 3, "section": "C", "field_of_study": "Science", "teacher_ids": ["t1"]},
            {"subject_id": "poetry", "name": "Poetry", "level": 3, "section": "C", "field_of_study": "Literature", "teacher_ids": ["t2"]}
        ],
        "availabilities": [available_everywhere("t1"), available_everywhere("t2")],
        "period_controls": [{"level": 3, "section": "C", "field_of_study": "Literature", "entries": [
            {"day": "Fri", "periods": {"1st_period": false}}
        ]}],
    }));
    let output = solved(&input);

    for (_, _, entry) in output.timetable.entries() {
        match entry.class_id.as_str() {
            "sci" => assert_eq!((entry.teacher_id.as_str(), entry.subject_name.as_str()), ("t1", "Biology")),
            "lit" => assert_eq!((entry.teacher_id.as_str(), entry.subject_name.as_str()), ("t2", "Poetry")),
            other => panic!("unexpected class {other}"),
        }
    }
    let fri = output.timetable.get("Fri", "1st_period");
    assert_eq!(fri.len(), 1);
    assert_eq!(fri[0].class_id, "sci");
    assert_eq!(output.filled_slots(), 47);
}

/// A contended week: more classes than teachers at most times.
fn contended_input() -> SchedulingInput {
    let pattern = |seed: usize| -> Value {
        let entries: Vec<Value> = DAYS
            .iter()
            .enumerate()
            .map(|(d, day)| {
                let periods: Vec<bool> = (0..4).map(|p| (d + p + seed) % 3 != 0).collect();
                json!({"day": day, "periods": periods})
            })
            .collect();
        json!(entries)
    };
    input(json!({
        "classes": [class("c1", "A", 1), class("c2", "A", 1), class("c3", "A", 1), class("c4", "B", 2)],
        "teachers": [
            teacher("t1", "Alice", "Smith", "female"),
            teacher("t2", "Bob", "Brown", "male"),
            teacher("t3", "Carol", "Jones", "female"),
            teacher("t4", "Ivy", "Thomas", "")
        ],
        "subjects": [
            subject("maths", "A", 1, &["t1", "t2"]),
            subject("art", "A", 1, &["t3"]),
            subject("history", "B", 2, &["t3", "t4"])
        ],
        "availabilities": [
            {"user_id": "t1", "entries": pattern(0)},
            {"user_id": "t2", "entries": pattern(1)},
            {"user_id": "t3", "entries": pattern(2)}
        ],
        "period_controls": [
            {"level": 1, "section": "A", "entries": [{"day": "Wed", "periods": {"3rd_period": false, "4th_period": false}}]},
            {"level": 1, "section": "A", "entries": [{"day": "Wed", "periods": {"3rd_period": true}}]}
        ],
    }))
}

#[test]
fn contended_week_respects_all_hard_constraints() {
    let input = contended_input();
    let output = solved(&input);
    assert_hard_constraints(&input, &output);

    for period in ["3rd_period", "4th_period"] {
        assert!(output
            .timetable
            .get("Wed", period)
            .iter()
            .all(|e| e.class_id == "c4"));
    }
    assert!(output.timetable.entries().all(|(_, _, e)| e.teacher_id != "t4"));

    // Entries of one (day, period) follow the input class order.
    let order: HashMap<&str, usize> = input
        .classes
        .iter()
        .enumerate()
        .map(|(i, c)| (c.class_id.as_str(), i))
        .collect();
    for day in &output.timetable.days {
        for period in &day.periods {
            let positions: Vec<usize> = period.entries.iter().map(|e| order[e.class_id.as_str()]).collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

#[test]
fn objective_is_stable_across_runs() {
    let input = contended_input();
    let first = solved(&input);
    let second = solved(&input);
    assert_eq!(first.filled_slots(), second.filled_slots());
    assert_eq!(first.filled_slots(), first.timetable.len());
}

#[test]
fn empty_input_yields_empty_timetable() {
    let output = solved(&SchedulingInput::default());
    assert!(output.timetable.is_empty());
    assert_eq!(output.filled_slots(), 0);
}

#[test]
fn malformed_availability_is_rejected() {
    let input = input(json!({
        "classes": [class("c1", "A", 1)],
        "teachers": [teacher("t1", "Alice", "Smith", "female")],
        "subjects": [subject("maths", "A", 1, &["t1"])],
        "availabilities": [{"user_id": "t1", "entries": [{"day": "Mon", "periods": [true, false]}]}],
    }));
    let err = solve(&input, &config()).unwrap_err();
    assert!(matches!(err, SchedulerError::Configuration(_)));
    assert!(err.to_string().contains("expected 4"));
}
