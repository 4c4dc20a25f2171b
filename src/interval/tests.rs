use super::*;

//-----------------------------------------------------------------------------

#[test]
fn orientation_flip_and_sign() {
    assert_eq!(Orientation::Forward.flip(), Orientation::Reverse);
    assert_eq!(Orientation::Reverse.flip(), Orientation::Forward);
    assert_eq!(Orientation::Forward.sign(), 1);
    assert_eq!(Orientation::Reverse.sign(), -1);
    for orientation in Orientation::BOTH {
        assert_eq!(orientation.flip().flip(), orientation, "Double flip changed {}", orientation);
    }
}

#[test]
fn orientation_from_strand() {
    for orientation in Orientation::BOTH {
        let converted = Orientation::from_strand(orientation.strand());
        assert!(converted.is_ok(), "Failed to convert strand {}", orientation.strand());
        assert_eq!(converted.unwrap(), orientation);
    }
    for strand in [0, 2, -2, 42] {
        let result = Orientation::from_strand(strand);
        assert!(
            matches!(result, Err(Error::InvariantViolation(_))),
            "Strand {} was not rejected", strand
        );
    }
}

#[test]
fn parse_position_end() {
    assert_eq!("5p".parse::<PositionEnd>().unwrap(), PositionEnd::Head);
    assert_eq!("head".parse::<PositionEnd>().unwrap(), PositionEnd::Head);
    assert_eq!("3p".parse::<PositionEnd>().unwrap(), PositionEnd::Tail);
    assert_eq!("tail".parse::<PositionEnd>().unwrap(), PositionEnd::Tail);

    let result = "middle".parse::<PositionEnd>();
    assert!(matches!(result, Err(Error::Configuration(_))), "Invalid reference point was accepted");
}

//-----------------------------------------------------------------------------

#[test]
fn head_and_tail_forward() {
    let interval = Interval::new(10, 20, Orientation::Forward, 1).unwrap();
    assert_eq!(interval.position(Orientation::Forward, PositionEnd::Head), 10);
    assert_eq!(interval.position(Orientation::Forward, PositionEnd::Tail), 19);
}

#[test]
fn head_and_tail_reverse() {
    let interval = Interval::new(10, 20, Orientation::Reverse, 1).unwrap();
    assert_eq!(interval.position(Orientation::Reverse, PositionEnd::Head), 19);
    assert_eq!(interval.position(Orientation::Reverse, PositionEnd::Tail), 10);
}

#[test]
fn single_base_interval() {
    let interval = Interval::new(10, 11, Orientation::Reverse, 1).unwrap();
    for orientation in Orientation::BOTH {
        for end in [PositionEnd::Head, PositionEnd::Tail] {
            assert_eq!(interval.position(orientation, end), 10, "Wrong {} position for orientation {}", end, orientation);
        }
    }
}

//-----------------------------------------------------------------------------

#[test]
fn stored_coordinates() {
    let interval = Interval::from_stored(-1, 10, 19, 3);
    assert!(interval.is_ok(), "Failed to convert a valid record: {}", interval.unwrap_err());
    let interval = interval.unwrap();
    assert_eq!(interval, Interval { start: 10, end: 20, orientation: Orientation::Reverse, weight: 3 });
}

#[test]
fn invalid_stored_records() {
    let invalid = [
        (0, 10, 19, 1),
        (1, -1, 19, 1),
        (1, 10, 9, 1),
        (1, 10, 19, 0),
    ];
    for (strand, start, stop, copy_number) in invalid {
        let result = Interval::from_stored(strand, start, stop, copy_number);
        assert!(
            matches!(result, Err(Error::InvariantViolation(_))),
            "Record ({}, {}, {}, {}) was not rejected", strand, start, stop, copy_number
        );
    }
    assert!(Interval::new(5, 5, Orientation::Forward, 1).is_err(), "Empty interval was accepted");
}

//-----------------------------------------------------------------------------
