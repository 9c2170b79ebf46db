pub mod converter_view;
