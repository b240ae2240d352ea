use mform_domain::{
    BasicInput, Condition, ConditionPredicate, DocumentBlockInput, FieldDefinition,
    FormDefinition, FormTemplate, InputDefinition, MultiselectInput, ParsedTemplate, SelectInput,
    SelectOption, SliderInput, TagInput, TemplateToken,
};

/// Form written into a fresh settings file so there is something to try.
pub fn example_form() -> FormDefinition {
    let basic = BasicInput::default;
    let fields = vec![
        FieldDefinition::new("name", InputDefinition::Text(basic()))
            .with_label("Name")
            .with_description("Your full name")
            .required(),
        FieldDefinition::new("age", InputDefinition::Number(basic()))
            .with_label("Age")
            .with_description("How old are you?"),
        FieldDefinition::new("dateOfBirth", InputDefinition::Date(basic()))
            .with_label("Date of birth"),
        FieldDefinition::new("likesCats", InputDefinition::Toggle(basic()))
            .with_label("Likes cats")
            .with_description("Do you like cats?"),
        FieldDefinition::new("catNames", InputDefinition::Tag(TagInput::default()))
            .with_label("Cat names")
            .with_condition(Condition::new(
                "likesCats",
                ConditionPredicate::Boolean { value: true },
            )),
        FieldDefinition::new(
            "favoriteMeal",
            InputDefinition::Select(SelectInput::Fixed {
                options: vec![
                    SelectOption::new("pizza", "Pizza"),
                    SelectOption::new("pasta", "Pasta"),
                    SelectOption::new("salad", "Salad"),
                ],
            }),
        )
        .with_label("Favorite meal"),
        FieldDefinition::new(
            "hobbies",
            InputDefinition::Multiselect(MultiselectInput::Fixed {
                multi_select_options: vec!["reading".into(), "hiking".into(), "gaming".into()],
                allow_unknown_values: true,
            }),
        )
        .with_label("Hobbies"),
        FieldDefinition::new(
            "happiness",
            InputDefinition::Slider(SliderInput {
                min: 1.0,
                max: 10.0,
            }),
        )
        .with_label("Happiness")
        .with_description("How happy are you today?"),
        FieldDefinition::new(
            "notice",
            InputDefinition::DocumentBlock(DocumentBlockInput {
                body: "Answers are written to the note's frontmatter.".into(),
            }),
        ),
        FieldDefinition::new("bio", InputDefinition::Textarea(basic()))
            .with_label("Bio")
            .with_condition(Condition::new("age", ConditionPredicate::Above { value: 17.0 })),
    ];

    let template = ParsedTemplate::new(vec![
        TemplateToken::frontmatter(Vec::new(), vec!["bio".into()]),
        TemplateToken::text("# "),
        TemplateToken::variable("name"),
        TemplateToken::text("\n\n"),
        TemplateToken::variable("bio"),
        TemplateToken::text("\n"),
    ]);

    FormDefinition::new("example-form", "Example form", fields).with_template(FormTemplate {
        create_command: true,
        parsed_template: template,
    })
}
