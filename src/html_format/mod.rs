pub mod html_format;
