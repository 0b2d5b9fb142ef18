//! The six-field extraction schema, shared by the prompt builder and the parser.

/// Top-level field names of a structured résumé.
pub const PERSONAL_INFO: &str = "personal_info";
pub const SUMMARY: &str = "summary";
pub const WORK_EXPERIENCE: &str = "work_experience";
pub const EDUCATION: &str = "education";
pub const SKILLS: &str = "skills";
pub const CERTIFICATIONS: &str = "certifications";

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON placeholder shown in the format instructions.
    pub example: &'static str,
}

/// Ordered field table. Prompt order and parse order both follow it.
pub const RESUME_FIELDS: [FieldSpec; 6] = [
    FieldSpec {
        name: PERSONAL_INFO,
        description: "Personal information including name, email, phone, location \
                      as an object with fields: name, email, phone, location",
        example: r#"{"name": "string", "email": "string", "phone": "string", "location": "string"}"#,
    },
    FieldSpec {
        name: SUMMARY,
        description: "Professional summary or objective statement",
        example: r#""string""#,
    },
    FieldSpec {
        name: WORK_EXPERIENCE,
        description: "List of work experiences with company, position, dates, and responsibilities",
        example: r#"[{"company": "string", "position": "string", "dates": "string", "responsibilities": ["string"]}]"#,
    },
    FieldSpec {
        name: EDUCATION,
        description: "Educational background including institutions, degrees, and dates",
        example: r#"[{"institution": "string", "degree": "string", "dates": "string"}]"#,
    },
    FieldSpec {
        name: SKILLS,
        description: "Technical and soft skills",
        example: r#"["string"]"#,
    },
    FieldSpec {
        name: CERTIFICATIONS,
        description: "Professional certifications and achievements",
        example: r#"["string"]"#,
    },
];

/// Machine-checkable output instructions derived from `RESUME_FIELDS`.
pub fn format_instructions() -> String {
    let mut out = String::from(
        "The output should be a markdown code snippet formatted in the following schema, \
         including the leading and trailing \"```json\" and \"```\":\n\n```json\n{\n",
    );
    for (i, field) in RESUME_FIELDS.iter().enumerate() {
        let separator = if i + 1 < RESUME_FIELDS.len() { "," } else { "" };
        out.push_str(&format!(
            "\t\"{}\": {}{}  // {}\n",
            field.name, field.example, separator, field.description
        ));
    }
    out.push_str("}\n```");
    out
}
