mod content_type_tests;
mod text_parser_tests;
