use super::texts::{CALL_TO_ACTION, SECTION_COURSE, SECTION_INSTRUCTOR, SECTION_QUESTION};
use crate::session::Submission;

/// Separators accepted between instructor names: Arabic comma, full-width
/// comma, slash and ASCII comma.
pub const INSTRUCTOR_DELIMITERS: [char; 4] = ['،', '，', '/', ','];

/// One entry per delimiter-separated segment, in input order.
pub fn split_instructors(raw: &str) -> Vec<&str> {
    raw.split(|ch: char| INSTRUCTOR_DELIMITERS.contains(&ch))
        .map(str::trim)
        .collect()
}

pub fn course_tag(course: &str) -> String {
    course.replace(' ', "_")
}

/// Builds the publishable text for a complete submission.
pub fn render_submission(submission: &Submission, channel_handle: &str) -> String {
    let instructors = split_instructors(&submission.instructor).join("\n");
    format!(
        "{SECTION_COURSE}{course}\n\n{SECTION_INSTRUCTOR}{instructors}\n\n{SECTION_QUESTION}{question}\n\n{CALL_TO_ACTION}\n\n{channel_handle}",
        course = course_tag(&submission.course),
        question = submission.question,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(course: &str, instructor: &str, question: &str) -> Submission {
        Submission {
            course: course.to_string(),
            instructor: instructor.to_string(),
            question: question.to_string(),
        }
    }

    #[test]
    fn mixed_delimiters_split_in_order() {
        assert_eq!(
            split_instructors("Smith/Jones،Lee"),
            vec!["Smith", "Jones", "Lee"]
        );
        assert_eq!(
            split_instructors("Dr. A, Dr. B，Dr. C"),
            vec!["Dr. A", "Dr. B", "Dr. C"]
        );
        assert_eq!(split_instructors("Solo"), vec!["Solo"]);
    }

    #[test]
    fn empty_segments_are_kept() {
        assert_eq!(split_instructors("A,,B"), vec!["A", "", "B"]);
        assert_eq!(split_instructors(""), vec![""]);
    }

    #[test]
    fn rendered_text_has_sections_in_fixed_order() {
        let text = render_submission(
            &submission("Linear Algebra 2", "Dr. A/Dr. B", "Is the final open book?"),
            "@example_channel",
        );
        assert_eq!(
            text,
            "درس: #Linear_Algebra_2\n\n🚬استاد: Dr. A\nDr. B\n\n❔سوال: Is the final open book?\n\n⚡️ به ما بپیوندید ↙️\n\n@example_channel"
        );
    }

    #[test]
    fn free_text_is_not_validated() {
        let text = render_submission(&submission("", "", ""), "@h");
        assert!(text.starts_with("درس: #\n\n🚬استاد: \n\n❔سوال: \n\n"));
        assert!(text.ends_with("@h"));
    }
}
