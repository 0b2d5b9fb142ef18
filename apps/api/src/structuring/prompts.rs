// Résumé structuring LLM prompt templates.

pub const STRUCTURE_SYSTEM: &str = "\
You are a precise resume data extractor. \
Read the CV text you are given and return the requested fields as JSON. \
Never invent information that is not present in the CV; use empty strings or \
empty lists for anything you cannot find.";

pub const STRUCTURE_PROMPT_TEMPLATE: &str = "\
Extract structured information from the following CV/resume.
For personal_info, parse it into an object with name, email, phone, and location fields.
If you find a string with multiple pieces of information, split them appropriately.

Format the output as JSON according to these instructions:
{format_instructions}

CV Content:
{cv_content}
";
