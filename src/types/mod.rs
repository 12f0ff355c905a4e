pub mod city;
pub mod city_detail;
pub mod dataset;
pub mod forecast;
